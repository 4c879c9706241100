// src/format.rs
//! Token list rendering for CLI collaborators
//!
//! One [`OutputFormatter`] per output style, chosen by [`OutputStyle`].

use std::io::{self, Write};

use crate::iterator::TokenIterator;
use crate::token::TokenRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    #[default]
    Table,
    Tsv,
}

pub trait OutputFormatter {
    fn header(&self, out: &mut dyn Write) -> io::Result<()>;
    fn row(&self, out: &mut dyn Write, index: usize, record: &TokenRecord) -> io::Result<()>;
    fn footer(&self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

const NAME_WIDTH: usize = 20;

pub struct TableFormatter;

impl TableFormatter {
    fn separator(out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "+-----+{}+--------+---+------+", "-".repeat(NAME_WIDTH + 2))
    }
}

impl OutputFormatter for TableFormatter {
    fn header(&self, out: &mut dyn Write) -> io::Result<()> {
        Self::separator(out)?;
        writeln!(
            out,
            "| {:>3} | {:<w$} | {:<6} | {:>1} | {:>4} |",
            "#",
            "Name",
            "Algo",
            "L",
            "Step",
            w = NAME_WIDTH
        )?;
        Self::separator(out)
    }

    fn row(&self, out: &mut dyn Write, index: usize, record: &TokenRecord) -> io::Result<()> {
        let mut name: String = record.name.chars().take(NAME_WIDTH).collect();
        if record.name.chars().count() > NAME_WIDTH {
            name.pop();
            name.push('~');
        }
        writeln!(
            out,
            "| {:>3} | {:<w$} | {:<6} | {:>1} | {:>4} |",
            index + 1,
            name,
            record.algo.to_string(),
            record.digits.count(),
            step_label(record),
            w = NAME_WIDTH
        )
    }

    fn footer(&self, out: &mut dyn Write) -> io::Result<()> {
        Self::separator(out)
    }
}

pub struct TsvFormatter;

impl OutputFormatter for TsvFormatter {
    fn header(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "#\tName\tAlgo\tDigits\tStep")
    }

    fn row(&self, out: &mut dyn Write, index: usize, record: &TokenRecord) -> io::Result<()> {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            index + 1,
            record.name,
            record.algo,
            record.digits.count(),
            step_label(record)
        )
    }
}

/// `30s` for TOTP, `c5` for an HOTP counter of 5
fn step_label(record: &TokenRecord) -> String {
    match (record.duration(), record.counter()) {
        (Some(duration), _) => format!("{duration}s"),
        (_, Some(counter)) => format!("c{counter}"),
        _ => String::new(),
    }
}

pub fn formatter_for(style: OutputStyle) -> Box<dyn OutputFormatter> {
    match style {
        OutputStyle::Table => Box::new(TableFormatter),
        OutputStyle::Tsv => Box::new(TsvFormatter),
    }
}

/// Render every token; unreadable entries are skipped. Returns rows written.
pub fn list_tokens(
    iter: &mut TokenIterator<'_>,
    style: OutputStyle,
    out: &mut dyn Write,
) -> io::Result<usize> {
    let formatter = formatter_for(style);
    let previous = iter.current_index();
    let mut rows = 0;

    formatter.header(out)?;
    for index in 0..iter.total_count() {
        if !iter.go_to(index) {
            continue;
        }
        if let Some(record) = iter.current() {
            formatter.row(out, index, record)?;
            rows += 1;
        }
    }
    formatter.footer(out)?;

    if let Some(index) = previous {
        iter.go_to(index);
    }
    Ok(rows)
}
