//! JSON report with a summary block

use super::{FileVerdict, Summary};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct Report<'a> {
    generated: String,
    version: &'static str,
    summary: Summary,
    files: &'a [FileVerdict],
}

pub fn write<W: Write>(out: &mut W, verdicts: &[FileVerdict]) -> io::Result<()> {
    let report = Report {
        generated: chrono::Local::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        summary: Summary::from_results(verdicts),
        files: verdicts,
    };

    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::verdict;

    #[test]
    fn test_report_shape() {
        let mut buf = Vec::new();
        write(&mut buf, &[verdict("a.jpg", Some(0.9)), verdict("b.bin", None)]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["summary"]["ai"], 1);
        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["files"][0]["result"]["human"], false);
        assert!(value["files"][0].get("error").is_none());
        assert_eq!(value["files"][1]["error"], "unsupported content type: blob.bin");
        assert!(value["generated"].is_string());
    }
}
