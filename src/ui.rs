use crate::period::PeriodToken;
use crate::ui_state::UiState;

pub fn render_index(ui: &UiState, periods: &[PeriodToken]) -> String {
    let options: String = periods
        .iter()
        .map(|token| {
            let selected = if *token == PeriodToken::default() { " selected" } else { "" };
            format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                token.as_str(),
                token.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n          ");

    INDEX_HTML
        .replace("{{THEME}}", ui.theme.as_str())
        .replace("{{SIDEBAR}}", if ui.sidebar_open { "open" } else { "closed" })
        .replace("{{PERIOD_OPTIONS}}", &options)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" data-theme="{{THEME}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Clients Dashboard</title>
  <style>
    :root {
      --bg: #f8f3e6;
      --ink: #2b2a28;
      --muted: #8b857d;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: #ffffff;
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    [data-theme="dark"] {
      --bg: #1d2329;
      --ink: #eef0f2;
      --muted: #9aa4ad;
      --accent-2: #8fb8d0;
      --card: #27303a;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      grid-template-columns: auto 1fr;
    }

    body.scroll-locked {
      overflow: hidden;
    }

    aside {
      width: 220px;
      padding: 24px 18px;
      background: var(--accent-2);
      color: white;
      transition: margin-left 200ms ease;
    }

    aside[data-state="closed"] {
      margin-left: -220px;
    }

    main {
      padding: 32px;
      display: grid;
      gap: 24px;
      align-content: start;
    }

    header {
      display: flex;
      gap: 12px;
      align-items: center;
      justify-content: space-between;
    }

    button, select {
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
    }

    .card {
      background: var(--card);
      border-radius: 20px;
      padding: 20px;
      box-shadow: var(--shadow);
    }

    #chart {
      width: 100%;
      height: 260px;
      display: block;
    }

    .bar {
      fill: var(--accent);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    #total {
      font-size: 1.7rem;
      color: var(--accent-2);
    }

    #toasts {
      position: fixed;
      right: 18px;
      bottom: 18px;
      display: grid;
      gap: 8px;
    }

    .toast {
      background: var(--card);
      border-left: 4px solid var(--accent-2);
      border-radius: 12px;
      padding: 12px 16px;
      box-shadow: var(--shadow);
      cursor: pointer;
    }

    .toast[data-level="warning"] { border-color: #e0a100; }
    .toast[data-level="error"] { border-color: #d64545; }
    .toast[data-level="success"] { border-color: #2e9d5b; }

    #modal {
      position: fixed;
      inset: 0;
      display: none;
      place-items: center;
      background: rgba(0, 0, 0, 0.4);
    }

    #modal.visible {
      display: grid;
    }
  </style>
</head>
<body>
  <aside id="sidebar" data-state="{{SIDEBAR}}">
    <h2>Dashboard</h2>
    <nav>
      <p>Clients</p>
      <p>Payments</p>
    </nav>
  </aside>

  <main>
    <header>
      <button id="sidebar-toggle" type="button">Menu</button>
      <h1>New clients</h1>
      <button id="theme-toggle" type="button">Theme</button>
    </header>

    <section class="card">
      <label for="period">Period</label>
      <select id="period">
          {{PERIOD_OPTIONS}}
      </select>
      <p>Total: <span id="total">--</span></p>
      <p id="range" class="chart-label"></p>
      <svg id="chart" role="img" aria-label="Daily new clients"></svg>
      <button id="details" type="button">Details</button>
    </section>
  </main>

  <div id="modal">
    <div class="card">
      <p id="modal-body"></p>
      <button id="modal-close" type="button">Close</button>
    </div>
  </div>

  <div id="toasts"></div>

  <script>
    const sidebarEl = document.getElementById('sidebar');
    const periodEl = document.getElementById('period');
    const chartEl = document.getElementById('chart');
    const totalEl = document.getElementById('total');
    const rangeEl = document.getElementById('range');
    const modalEl = document.getElementById('modal');
    const modalBodyEl = document.getElementById('modal-body');
    const toastsEl = document.getElementById('toasts');

    let lastSeries = null;

    const applyState = (state) => {
      document.documentElement.dataset.theme = state.theme;
      sidebarEl.dataset.state = state.sidebar_open ? 'open' : 'closed';
      document.body.classList.toggle('scroll-locked', state.scroll_locked);
      modalEl.classList.toggle('visible', state.open_modal !== null);
    };

    const dispatch = async (action) => {
      const res = await fetch('/api/ui', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(action)
      });
      if (res.ok) {
        applyState(await res.json());
      }
    };

    const renderBars = (series) => {
      const width = 600;
      const height = 260;
      const bottom = 24;
      const max = Math.max(1, ...series.values);
      const step = width / series.values.length;
      const labelEvery = series.values.length > 31 ? 7 : series.values.length > 10 ? 2 : 1;

      chartEl.setAttribute('viewBox', `0 0 ${width} ${height}`);
      chartEl.innerHTML = series.values
        .map((value, index) => {
          const barHeight = ((height - bottom) * value) / max;
          const x = index * step;
          const label = index % labelEvery === 0
            ? `<text class="chart-label" x="${x + step / 2}" y="${height - 6}" text-anchor="middle">${series.labels[index]}</text>`
            : '';
          return `<rect class="bar" x="${x + 1}" y="${height - bottom - barHeight}" width="${Math.max(step - 2, 1)}" height="${barHeight}" />${label}`;
        })
        .join('');
    };

    const loadSeries = async () => {
      const res = await fetch(`/api/series?period=${encodeURIComponent(periodEl.value)}`);
      if (!res.ok) {
        return;
      }
      const outcome = await res.json();
      lastSeries = outcome.series;
      totalEl.textContent = outcome.series.values.reduce((acc, value) => acc + value, 0);
      rangeEl.textContent = `${outcome.series.range.start} to ${outcome.series.range.end}`;
      renderBars(outcome.series);
      loadToasts();
    };

    const renderToasts = (items) => {
      toastsEl.innerHTML = '';
      items.forEach((item) => {
        const el = document.createElement('div');
        el.className = 'toast';
        el.dataset.level = item.level;
        el.textContent = item.message;
        el.addEventListener('click', async () => {
          await fetch(`/api/notifications/${item.id}`, { method: 'DELETE' });
          loadToasts();
        });
        toastsEl.appendChild(el);
      });
    };

    const loadToasts = async () => {
      const res = await fetch('/api/notifications');
      if (res.ok) {
        renderToasts(await res.json());
      }
    };

    document.getElementById('sidebar-toggle')
      .addEventListener('click', () => dispatch({ type: 'toggle_sidebar' }));
    document.getElementById('theme-toggle')
      .addEventListener('click', () => dispatch({ type: 'toggle_theme' }));
    document.getElementById('details').addEventListener('click', () => {
      modalBodyEl.textContent = lastSeries
        ? `${lastSeries.values.length} days, ${lastSeries.values.filter((v) => v > 0).length} with new clients.`
        : 'No data loaded.';
      dispatch({ type: 'open_modal', id: 'series-details', viewport_width: window.innerWidth });
    });
    document.getElementById('modal-close')
      .addEventListener('click', () => dispatch({ type: 'close_modal' }));
    periodEl.addEventListener('change', () => loadSeries());

    fetch('/api/ui').then((res) => res.json()).then(applyState);
    loadSeries();
    setInterval(loadToasts, 2000);
  </script>
</body>
</html>
"#;
