//! Numbered prompt for picking one match in a terminal.

use std::io::{BufRead, Write};

use cscope_nav_core::{Choice, Chooser};

/// Lists rows on `output` and reads the answer from `input`.
///
/// Answers: a 1-based row number, `/text` to narrow the list to rows whose
/// search column contains `text`, or an empty line to cancel.
pub struct TerminalChooser<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalChooser<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn print_rows(&mut self, rows: &[Vec<String>], visible: &[usize]) -> std::io::Result<()> {
        for (n, &index) in visible.iter().enumerate() {
            let row = &rows[index];
            let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or_default();
            writeln!(
                self.output,
                "{:>3}) {}:{} [{}] {}",
                n + 1,
                cell(1),
                cell(2),
                cell(0),
                cell(3).trim()
            )?;
        }
        write!(self.output, "Select [1-{}], /filter, or empty to cancel: ", visible.len())?;
        self.output.flush()
    }

    fn prompt(
        &mut self,
        columns: &[&str],
        rows: &[Vec<String>],
        search_column: usize,
    ) -> std::io::Result<Choice> {
        writeln!(self.output, "{}", columns.join(" | "))?;
        let mut visible: Vec<usize> = (0..rows.len()).collect();
        loop {
            self.print_rows(rows, &visible)?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(Choice::Cancelled);
            }
            let answer = line.trim();

            if let Some(filter) = answer.strip_prefix('/') {
                let narrowed: Vec<usize> = (0..rows.len())
                    .filter(|&i| {
                        rows[i]
                            .get(search_column)
                            .is_some_and(|cell| cell.contains(filter))
                    })
                    .collect();
                if narrowed.is_empty() {
                    writeln!(self.output, "no rows match {filter:?}")?;
                } else {
                    visible = narrowed;
                }
                continue;
            }

            return Ok(match answer.parse::<usize>() {
                Ok(n) if n >= 1 && n <= visible.len() => Choice::Selected(visible[n - 1]),
                _ => Choice::Cancelled,
            });
        }
    }
}

impl<R: BufRead, W: Write> Chooser for TerminalChooser<R, W> {
    fn choose_one(
        &mut self,
        columns: &[&str],
        rows: &[Vec<String>],
        default_search_column: usize,
    ) -> Choice {
        self.prompt(columns, rows, default_search_column)
            .unwrap_or(Choice::Cancelled)
    }
}
