/// Plain-text table with a rule under the header and an optional footer row
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    footer: Option<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn footer(&mut self, cells: Vec<String>) {
        self.footer = Some(cells);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for cells in self.rows.iter().chain(self.footer.iter()) {
            for (i, cell) in cells.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    fn line(cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!("{:<width$}", cell, width = w)
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        let rule = rule.join("  ");

        let mut out = String::new();
        out.push_str(&Self::line(&self.headers, &widths));
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        for cells in &self.rows {
            out.push_str(&Self::line(cells, &widths));
            out.push('\n');
        }
        if let Some(footer) = &self.footer {
            out.push_str(&rule);
            out.push('\n');
            out.push_str(&Self::line(footer, &widths));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_aligns_columns() {
        let mut table = Table::new(["ID", "Keyword"]);
        table.row(vec!["1".into(), "coding".into()]);
        table.row(vec!["12".into(), "go".into()]);
        table.footer(vec!["".into(), "TOTAL".into()]);

        let expected = "\
ID  Keyword
──  ───────
1   coding
12  go
──  ───────
    TOTAL
";
        assert_eq!(table.render(), expected);
    }
}
