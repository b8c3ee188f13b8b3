//! Semicolon-separated report lines.

use std::io::{self, Write};

use crate::traits::ReportSink;

use super::types::ExtractedRecord;

const HEADER: [&str; 10] = [
    "Identificador",
    "Entidad",
    "Nomenclatura",
    "Objeto",
    "Descripción",
    "Valor",
    "Moneda",
    "Ganador",
    "Es MYPE",
    "Es Selva",
];

/// Columns written inside double quotes
const QUOTED: [bool; 10] = [false, true, true, false, true, false, false, true, false, false];

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\"").replace(['\r', '\n'], " "))
}

fn format_line(fields: [&str; 10]) -> String {
    fields
        .iter()
        .zip(QUOTED)
        .map(|(field, quoted)| {
            if quoted {
                quote(field)
            } else {
                field.replace(['\r', '\n', ';'], " ")
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Formats one record as a report line (without trailing newline).
pub fn record_line(record: &ExtractedRecord) -> String {
    let id = record.sequence_id.to_string();
    format_line([
        id.as_str(),
        record.entity.as_str(),
        record.nomenclature.as_str(),
        record.object_type.as_str(),
        record.description.as_str(),
        record.value.as_str(),
        record.currency.as_str(),
        record.winner_name.as_str(),
        record.small_business.as_str(),
        record.jungle_region.as_str(),
    ])
}

/// Writes report lines to any writer, flushing after each line so partial
/// output survives an aborted run.
pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ReportWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ReportSink for ReportWriter<W> {
    fn header(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", format_line(HEADER))?;
        self.out.flush()
    }

    fn emit(&mut self, record: &ExtractedRecord) -> io::Result<()> {
        writeln!(self.out, "{}", record_line(record))?;
        self.out.flush()
    }
}

/// Counts what passes through to the inner sink.
pub struct CountingSink<'a, S: ?Sized> {
    inner: &'a mut S,
    emitted: usize,
}

impl<'a, S: ReportSink + ?Sized> CountingSink<'a, S> {
    pub fn new(inner: &'a mut S) -> Self {
        Self { inner, emitted: 0 }
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl<S: ReportSink + ?Sized> ReportSink for CountingSink<'_, S> {
    fn header(&mut self) -> io::Result<()> {
        self.inner.header()
    }

    fn emit(&mut self, record: &ExtractedRecord) -> io::Result<()> {
        self.inner.emit(record)?;
        self.emitted += 1;
        Ok(())
    }
}
