//! HTML email body for the daily KPI report.

use std::fmt::Write as _;

use kpi_core::{KpiColumn, KpiGrid, ReportMeta};

const STYLE: &str = r"
        <style>
            table {
                border-collapse: collapse;
                width: 100%;
            }
            th {
                background-color: #427bf5;
                color: #fafafa;
                border: 1px solid black;
                text-align: center;
                font-size: 12px;
                padding: 8px;
            }
            td {
                border: 1px solid black;
                text-align: center;
                font-size: 12px;
                padding: 8px;
            }
            tr:last-child td {
                color: #427bf5;
                background-color: #f2e3b8;
            }
        </style>";

const FOOTER: &str = r#"
        <p><font size="1">
            ※このメールアドレスは送信専用のため、返信は受け付けておりません。<br>
            ※ご意見・ご要望は、担当者までお願いします。
        </font></p>"#;

/// Renders the full HTML document: stylesheet, title, scope note, the KPI
/// table, and the no-reply footer. The newest day is the last row.
#[must_use]
pub fn render_report(grid: &KpiGrid, meta: &ReportMeta) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<html>\n    <head>");
    html.push_str(STYLE);
    html.push_str("\n    </head>\n    <body>\n");
    let _ = writeln!(
        html,
        "        <h3>■Daily KPI Report for '{}'</h3>",
        escape(&meta.project_name)
    );
    let _ = write!(
        html,
        "        <p><font size=\"2\">\n            ・{} server / last 7 days<br>\n            ・SALES, ARPPU: {} 基準\n        </font></p>\n",
        escape(&meta.server_label),
        escape(&meta.currency)
    );
    html.push_str(&render_table(grid));
    html.push_str(FOOTER);
    html.push_str("\n    </body>\n</html>\n");
    html
}

fn render_table(grid: &KpiGrid) -> String {
    let mut table = String::from("<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr>\n");
    for column in KpiColumn::ALL {
        let _ = writeln!(table, "      <th>{}</th>", escape(column.header()));
    }
    table.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for row in grid.rows() {
        table.push_str("    <tr>\n");
        for cell in row {
            let _ = writeln!(table, "      <td>{}</td>", escape(cell));
        }
        table.push_str("    </tr>\n");
    }
    table.push_str("  </tbody>\n</table>");
    table
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
