use crate::store::MacroIndicatorRow;

/// Most rows ever placed in the prompt.
pub const MAX_MACRO_ROWS: usize = 12;

const TABLE_HEADER: &str = "indicator,period,value,source";

/// CSV rendering of `rows` in their given order, capped at [`MAX_MACRO_ROWS`].
pub fn indicator_table(rows: &[MacroIndicatorRow]) -> String {
    let mut table = String::from(TABLE_HEADER);
    table.push('\n');

    for row in rows.iter().take(MAX_MACRO_ROWS) {
        let value = row.value.map(|v| v.to_string()).unwrap_or_default();
        let fields = [
            csv_field(&row.indicator),
            csv_field(&row.period),
            value,
            csv_field(&row.source),
        ];
        table.push_str(&fields.join(","));
        table.push('\n');
    }

    table
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn build_macro_prompt(startup_text: &str, indicator_table: &str) -> String {
    format!(
        r#"What macro-level risks could impact this startup, including political, technical, environmental, or ESG factors?
Here is the startup description:
{}

Here are the latest macro trends (most recent periods first, from OECD data):

{}
Based on this data, provide an expert-level analysis of potential macro risks (political, economic, technical, regulatory, ESG, environmental, etc) that may affect the business, with concrete examples and suggestions.
Output in fluent English with clear sections for each risk type."#,
        startup_text, indicator_table
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(i: usize) -> MacroIndicatorRow {
        MacroIndicatorRow {
            indicator: "CPI".to_string(),
            period: format!("2024-{:02}", 12 - (i % 12)),
            value: Some(i as f64 + 0.5),
            source: "OECD".to_string(),
        }
    }

    #[test]
    fn test_table_keeps_order_and_caps_rows() {
        let rows: Vec<_> = (0..15).map(row).collect();

        let table = indicator_table(&rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "indicator,period,value,source");
        assert_eq!(lines.len(), 1 + MAX_MACRO_ROWS);
        assert_eq!(lines[1], "CPI,2024-12,0.5,OECD");
        assert_eq!(lines[2], "CPI,2024-11,1.5,OECD");
        assert_eq!(lines[12], "CPI,2024-01,11.5,OECD");
    }

    #[test]
    fn test_short_input_is_not_padded() {
        let rows: Vec<_> = (0..3).map(row).collect();
        assert_eq!(indicator_table(&rows).lines().count(), 4);
        assert_eq!(indicator_table(&[]), "indicator,period,value,source\n");
    }

    #[test]
    fn test_fields_are_quoted_when_needed() {
        let rows = vec![MacroIndicatorRow {
            indicator: "Unemployment, total".to_string(),
            period: "2024-Q3".to_string(),
            value: None,
            source: "Survey \"LFS\"".to_string(),
        }];

        let table = indicator_table(&rows);

        assert_eq!(
            table.lines().nth(1),
            Some("\"Unemployment, total\",2024-Q3,,\"Survey \"\"LFS\"\"\"")
        );
    }

    #[test]
    fn test_prompt_embeds_text_and_table() {
        let prompt = build_macro_prompt("Solar microgrids for farms.", "indicator,period,value,source\n");
        assert!(prompt.contains("startup description:\nSolar microgrids for farms."));
        assert!(prompt.contains("indicator,period,value,source"));
    }
}
