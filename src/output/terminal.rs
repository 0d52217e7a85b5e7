//! Terminal output of the rejection report.

use crate::processing::RejectionLog;
use colored::Colorize;
use std::io::{self, Write};

/// Print every rejected token verbatim, one per line, then the count.
pub fn report_rejections<W: Write>(rejected: &RejectionLog, mut writer: W) -> io::Result<()> {
    for r in rejected.iter() {
        log::debug!("row {} {:?}: {}", r.row, r.token, r.reason);
        writeln!(writer, "{}", r.token)?;
    }
    let count = rejected.len().to_string();
    let count = if rejected.is_empty() {
        count.green()
    } else {
        count.red()
    };
    writeln!(writer, "There are {count} bad ips need fixing.")?;
    Ok(())
}
