use crate::model::ReportData;

/// Options that only affect presentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Draw the active-jobs step chart under the Gantt chart.
    pub show_active_jobs: bool,
}

/// Render a self-contained HTML report (data embedded as JSON).
///
/// Important: we avoid `format!()` because the HTML contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(data: &ReportData, opts: RenderOptions) -> anyhow::Result<String> {
    // Embedded as a JS object literal; `<` is escaped so no string in the
    // data can close the script element.
    let json = serde_json::to_string(data)?.replace('<', "\\u003c");

    const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>HyperFlow execution timeline</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  h1 { font-size: 18px; margin: 0 0 8px 0; }
  h2 { font-size: 15px; margin: 16px 0 4px 0; }
  .main { padding: 12px 16px; }

  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .legend { display: flex; gap: 12px; flex-wrap: wrap; font-size: 13px; margin: 8px 0; }
  .swatch { display: inline-block; width: 12px; height: 12px; border-radius: 2px; margin-right: 4px; vertical-align: middle; }
  .muted { color: #777; font-size: 12px; }
  svg text { font-size: 11px; fill: #333; }
  .grid { stroke: #eee; }
  .axis { stroke: #999; }
</style>
</head>
<body>
<header>
  <h1 id="title"></h1>
  <div class="summary" id="summary"></div>
</header>

<div class="main">
  <h2>Execution process</h2>
  <div class="legend" id="legend"></div>
  <div id="gantt"></div>
  <div id="activeSection" style="display:none;">
    <h2>Active jobs</h2>
    <div id="active"></div>
  </div>
  <div id="tooltip" class="muted"></div>
</div>

<script>
// Embedded report data (JSON object literal)
const DATA = __DATA__;
const SHOW_ACTIVE = __SHOW_ACTIVE__;

const ROW = 30;
const LEFT = 140;
const WIDTH = 1200;
const SVG_NS = "http://www.w3.org/2000/svg";

function fmtS(x) {
  return (Math.round(x * 1000) / 1000).toFixed(3);
}

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function el(name, attrs) {
  const e = document.createElementNS(SVG_NS, name);
  for (const [k, v] of Object.entries(attrs)) e.setAttribute(k, v);
  return e;
}

const colors = new Map();
DATA.task_types.forEach((t, i) => {
  const hue = DATA.task_types.length ? Math.round(300 * i / DATA.task_types.length) : 0;
  colors.set(t, hue);
});
function color(task, light) {
  const hue = colors.has(task) ? colors.get(task) : 0;
  return light ? `hsl(${hue}, 80%, 80%)` : `hsl(${hue}, 85%, 50%)`;
}

const axisMax = Math.max(DATA.max_time, 1);
function x(t) {
  return LEFT + (WIDTH - LEFT - 10) * t / axisMax;
}

function renderSummary() {
  const w = DATA.workflow;
  document.getElementById("title").textContent = `${w.name} (size ${w.size}, version ${w.version})`;
  const t = DATA.totals;
  document.getElementById("summary").innerHTML = `
    <span class="pill">jobs: <b>${t.jobs}</b></span>
    <span class="pill">nodes: <b>${t.nodes}</b></span>
    <span class="pill">lanes: <b>${t.lanes}</b></span>
    <span class="pill">peak active: <b>${t.peak_active}</b></span>
    <span class="pill">span: <b>${DATA.max_time} s</b></span>
    <span class="pill">epoch: <b>${escapeHtml(DATA.epoch || "-")}</b></span>
  `;
}

function renderLegend() {
  const root = document.getElementById("legend");
  root.innerHTML = DATA.task_types
    .map(t => `<span><span class="swatch" style="background:${color(t, false)}"></span>${escapeHtml(t)}</span>`)
    .join("");
}

function drawTimeAxis(svg, height) {
  const step = Math.max(1, Math.ceil(axisMax / 20));
  for (let t = 0; t <= axisMax; t += step) {
    svg.appendChild(el("line", { x1: x(t), x2: x(t), y1: 0, y2: height - 20, class: "grid" }));
    const label = el("text", { x: x(t), y: height - 6, "text-anchor": "middle" });
    label.textContent = t;
    svg.appendChild(label);
  }
}

function renderGantt() {
  const height = DATA.lanes.length * ROW + 30;
  const svg = el("svg", { width: WIDTH, height: height });
  drawTimeAxis(svg, height);

  let lastNode = null;
  let shaded = false;
  DATA.lanes.forEach((lane, i) => {
    const top = i * ROW;
    if (lane.index === 0 || lane.node_name !== lastNode) {
      lastNode = lane.node_name;
      shaded = !shaded;
    }
    if (shaded) {
      svg.appendChild(el("rect", { x: LEFT, y: top, width: WIDTH - LEFT, height: ROW, fill: "#000", "fill-opacity": 0.05 }));
    }
    const label = el("text", { x: LEFT - 6, y: top + ROW / 2 + 4, "text-anchor": "end" });
    label.textContent = lane.label;
    svg.appendChild(label);

    for (const job of lane.jobs) {
      const handler = el("rect", {
        x: x(job.handler_start), y: top + ROW / 2 - 2,
        width: Math.max(1, x(job.handler_end) - x(job.handler_start)), height: 4,
        fill: color(job.task_type, true),
      });
      const work = el("rect", {
        x: x(job.job_start), y: top + ROW / 2 - 8,
        width: Math.max(1, x(job.job_end) - x(job.job_start)), height: 16,
        fill: color(job.task_type, false), "fill-opacity": 0.85,
      });
      const info = `${job.job_id} [${job.task_type}] on ${job.node_name}: handler ${fmtS(job.handler_start)}-${fmtS(job.handler_end)} s, job ${fmtS(job.job_start)}-${fmtS(job.job_end)} s`;
      for (const r of [handler, work]) {
        r.onmouseenter = () => { document.getElementById("tooltip").textContent = info; };
        svg.appendChild(r);
      }
    }
  });

  document.getElementById("gantt").appendChild(svg);
}

function renderActive() {
  const samples = DATA.occupancy;
  const peak = Math.max(1, DATA.totals.peak_active);
  const height = 200;
  const plot = height - 30;
  const y = v => 5 + plot - plot * v / peak;

  const svg = el("svg", { width: WIDTH, height: height });
  drawTimeAxis(svg, height);

  let d = "";
  samples.forEach((s, i) => {
    d += i === 0 ? `M ${x(s.time_offset)} ${y(s.active)}` : ` H ${x(s.time_offset)} V ${y(s.active)}`;
  });
  if (samples.length) d += ` H ${x(axisMax)}`;
  svg.appendChild(el("path", { d: d, fill: "none", stroke: "#1f77b4", "stroke-width": 2 }));

  for (const v of [0, peak]) {
    const label = el("text", { x: LEFT - 6, y: y(v) + 4, "text-anchor": "end" });
    label.textContent = v;
    svg.appendChild(label);
  }

  document.getElementById("active").appendChild(svg);
  document.getElementById("activeSection").style.display = "block";
}

renderSummary();
renderLegend();
renderGantt();
if (SHOW_ACTIVE) renderActive();
</script>
</body>
</html>
"##;

    let show_active = if opts.show_active_jobs { "true" } else { "false" };
    Ok(TEMPLATE
        .replace("__DATA__", &json)
        .replace("__SHOW_ACTIVE__", show_active))
}
