//! CSV report, one row per file

use super::FileVerdict;
use std::io::{self, Write};

const HEADER: &str = "file_path,file_name,verdict,ai_score,confidence,content_type,detectors,content_hash,error";

pub fn write<W: Write>(out: &mut W, verdicts: &[FileVerdict]) -> io::Result<()> {
    writeln!(out, "{}", HEADER)?;

    for v in verdicts {
        match &v.result {
            Some(r) => writeln!(
                out,
                "{},{},{},{:.4},{:.4},{},{},{},",
                escape(&v.file_path),
                escape(&v.file_name),
                if r.human { "HUMAN" } else { "AI" },
                r.ai_score,
                r.confidence,
                r.content_type,
                escape(&r.detectors.join(";")),
                r.content_hash,
            )?,
            None => writeln!(
                out,
                "{},{},ERROR,,,,,,{}",
                escape(&v.file_path),
                escape(&v.file_name),
                escape(v.error.as_deref().unwrap_or("")),
            )?,
        }
    }

    Ok(())
}

/// Quote a field when it contains a delimiter, quote or newline
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
