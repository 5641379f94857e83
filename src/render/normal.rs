use super::{escape_html, initials, table_cells, PageContext};

pub fn render(ctx: &PageContext<'_>) -> String {
    let title = escape_html(&ctx.settings.title);
    let subtitle = escape_html(&ctx.settings.subtitle);
    let stylesheet = escape_html(&ctx.settings.stylesheet_href);
    let query = escape_html(ctx.query);
    let stats = ctx.stats();
    let updated = ctx.generated_at.format("%d.%m.%Y %H:%M");
    let year = ctx.generated_at.format("%Y");

    let reset_link = if ctx.has_query() {
        r#"
          <a href="?" class="btn btn-secondary"><span>🗑️</span> Reset search</a>"#
    } else {
        ""
    };

    let body = if ctx.records.is_empty() {
        render_no_data(ctx.has_query())
    } else {
        let mut out = render_table(ctx);
        if ctx.has_query() {
            out.push_str(&format!(
                r#"
      <div class="stats search-result">
        <div class="stat-item">
          <div class="stat-icon">🔍</div>
          <div>Students found: <strong>{count}</strong> for query: "<strong>{query}</strong>"</div>
        </div>
      </div>"#,
                count = stats.total,
                query = query,
            ));
        }
        out
    };

    format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <link rel="stylesheet" href="{stylesheet}">
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>🎓 {title}</h1>
      <p>{subtitle}</p>
    </div>

    <div class="content">
      <div class="stats">
        <div class="stat-item">
          <div class="stat-icon">👥</div>
          <div>Total students: <strong>{total}</strong></div>
        </div>
        <div class="stat-item">
          <div class="stat-icon">📚</div>
          <div>Distinct groups: <strong>{groups}</strong></div>
        </div>
        <div class="stat-item">
          <div class="stat-icon">⭐</div>
          <div>Updated: <strong>{updated}</strong></div>
        </div>
      </div>

      <div class="toolbar">
        <form method="GET" action="" class="search-form">
          <div class="search-box">
            <input type="text" name="search" value="{query}" placeholder="Search by name or group...">
            <span class="search-icon">🔍</span>
          </div>
          <button type="submit" class="btn"><span>🔍</span> Search</button>{reset_link}
        </form>

        <div class="toolbar-actions">
          <a class="btn" href="?export=pdf"><span>📄</span> Export to PDF</a>
          <button class="btn btn-secondary" onclick="location.reload()"><span>🔄</span> Refresh</button>
        </div>
      </div>
{body}
      <div class="footer">
        <p>{subtitle} • {year}</p>
      </div>
    </div>
  </div>
</body>
</html>
"####,
        title = title,
        subtitle = subtitle,
        stylesheet = stylesheet,
        total = stats.total,
        groups = stats.distinct_groups,
        updated = updated,
        query = query,
        reset_link = reset_link,
        body = body,
        year = year,
    )
}

fn render_table(ctx: &PageContext<'_>) -> String {
    let mut rows = String::new();
    for (i, record) in ctx.records.iter().enumerate() {
        let [group, index, fio] = table_cells(record);
        let class = if i % 2 == 0 { "highlight" } else { "" };
        rows.push_str(&format!(
            r#"
            <tr class="{class}">
              <td><span class="cell-group">{group}</span></td>
              <td><span class="cell-index">{index}</span></td>
              <td class="cell-fio">{fio}</td>
              <td><div class="student-avatar" title="{fio}">{initials}</div></td>
            </tr>"#,
            class = class,
            group = group,
            index = index,
            fio = fio,
            initials = escape_html(&initials(record.fio.as_deref())),
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
              <th>Initials</th>
            </tr>
          </thead>
          <tbody>{rows}
          </tbody>
        </table>
      </div>"#,
        rows = rows
    )
}

fn render_no_data(has_query: bool) -> String {
    let hint = if has_query {
        "Try a different search query"
    } else {
        "Check the data source file"
    };
    format!(
        r#"
      <div class="no-data">
        <div class="icon">📭</div>
        <p>No data to display</p>
        <p class="no-data-hint">{hint}</p>
      </div>"#,
        hint = hint
    )
}
