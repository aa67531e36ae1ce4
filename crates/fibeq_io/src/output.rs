use std::{
    fmt::{Display, Formatter},
    io::{self, Write},
};

use fibeq_ver::{DiffReport, DivergenceRecord};

/// What [write_report] prints for equivalent tables.
pub const EQUIVALENT: &str = "Yes";

/// Displays a record as `a.b.c.d/len, hop_a, hop_b`.
pub struct ReportLine<'a>(pub &'a DivergenceRecord);

impl Display for ReportLine<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.0.prefix, self.0.hop_a, self.0.hop_b)
    }
}

/// Writes one line per record, or [EQUIVALENT] alone when the report is empty.
pub fn write_report<W: Write>(mut writer: W, report: &DiffReport) -> io::Result<()> {
    if report.is_equivalent() {
        writeln!(writer, "{EQUIVALENT}")?;
    } else {
        for record in report {
            writeln!(writer, "{}", ReportLine(record))?;
        }
    }
    writer.flush()
}
