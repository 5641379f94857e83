use super::{escape_html, table_cells, PageContext};

/// Delay before the print dialog opens, in milliseconds.
pub const PRINT_DELAY_MS: u64 = 1000;

pub fn render(ctx: &PageContext<'_>) -> String {
    let title = escape_html(&ctx.settings.title);
    let subtitle = escape_html(&ctx.settings.subtitle);
    let stylesheet = escape_html(&ctx.settings.stylesheet_href);
    let generated = ctx.generated_at.format("%d.%m.%Y %H:%M:%S");

    let body = if ctx.records.is_empty() {
        r#"
      <div class="no-data">
        <div class="icon">📭</div>
        <p>No data</p>
      </div>"#
            .to_string()
    } else {
        render_table(ctx)
    };

    format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Export to PDF</title>
  <link rel="stylesheet" href="{stylesheet}">
</head>
<body class="print-mode">
  <div class="no-print print-bar">
    <button class="btn btn-print" onclick="window.print()"><span>🖨️</span> Print / Save as PDF</button>
    <a class="btn btn-secondary" href="?"><span>←</span> Back to table</a>
  </div>

  <div class="container">
    <div class="header">
      <h1>{title}</h1>
      <p>{subtitle}</p>
    </div>

    <div class="content">
      <div class="stats">
        <div class="stat-item">
          <div class="stat-icon">👥</div>
          <div>Total students: <strong>{total}</strong></div>
        </div>
        <div class="stat-item">
          <div class="stat-icon">📅</div>
          <div>Generated: <strong>{generated}</strong></div>
        </div>
      </div>
{body}
      <div class="footer">
        <p>Report generated automatically • {subtitle}</p>
      </div>
    </div>
  </div>

  <script>
    window.onload = function() {{
      setTimeout(function() {{
        window.print();
      }}, {delay});
    }};
  </script>
</body>
</html>
"####,
        stylesheet = stylesheet,
        title = title,
        subtitle = subtitle,
        total = ctx.records.len(),
        generated = generated,
        body = body,
        delay = PRINT_DELAY_MS,
    )
}

fn render_table(ctx: &PageContext<'_>) -> String {
    let mut rows = String::new();
    for record in ctx.records {
        let [group, index, fio] = table_cells(record);
        rows.push_str(&format!(
            r#"
            <tr>
              <td>{group}</td>
              <td>{index}</td>
              <td>{fio}</td>
            </tr>"#
        ));
    }

    format!(
        r#"
      <div class="table-container">
        <table>
          <thead>
            <tr>
              <th>Group</th>
              <th>Index</th>
              <th>Full name</th>
            </tr>
          </thead>
          <tbody>{rows}
          </tbody>
        </table>
      </div>"#
    )
}
