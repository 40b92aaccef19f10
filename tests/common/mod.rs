#![cfg(unix)]
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Writes an executable `/bin/sh` script standing in for ripgrep.
pub fn fake_tool(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-rg");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// A `--json` record as ripgrep prints it.
pub fn rg_line(kind: &str, path: &str, line: u64, text: &str) -> String {
    serde_json::json!({
        "type": kind,
        "data": {
            "path": { "text": path },
            "lines": { "text": text },
            "line_number": line,
            "absolute_offset": 0,
            "submatches": []
        }
    })
    .to_string()
}

/// Script body that prints `lines` to stdout and exits with `code`.
pub fn emit(lines: &[String], code: i32) -> String {
    let mut body = String::from("cat <<'RGDESK_EOF'\n");
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }
    body.push_str("RGDESK_EOF\n");
    body.push_str(&format!("exit {code}"));
    body
}
