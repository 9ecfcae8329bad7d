//! Parsers for `VBoxManage` text output.
//!
//! Both grammars the tool's output is read with live here, so a formatting
//! change in VBoxManage only ever touches this file.
//!
//! VM listing (`VBoxManage list vms`):
//!
//! ```text
//! "web1" {3e2f1c1e-8a55-4c1b-9a0e-2b0f4d7e9a11}
//! "db server" {0b8f7b5e-5d3a-4f3e-bb0c-0d8d8c3f6a22}
//! ```
//!
//! Snapshot section of `VBoxManage showvminfo <vm>`:
//!
//! ```text
//! Snapshots:
//!
//!    Name: 2024/01/01 03:00:00 (UUID: 9b7c...)
//!    Name: 2024/01/02 03:00:00 (UUID: 41a0...) *
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{HypervisorError, Result};
use crate::types::{Snapshot, SnapshotList, VirtualMachine};

/// Header line that opens the snapshot block.
const SNAPSHOTS_MARKER: &str = "Snapshots:";

static SNAPSHOT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*Name: (.*) \(UUID: (.*)\)").expect("snapshot line pattern is valid")
});

/// Parse `list vms` output into one [`VirtualMachine`] per non-blank line.
pub fn parse_vm_list(text: &str) -> Result<Vec<VirtualMachine>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_vm_line)
        .collect()
}

/// Parse a single `"<name>" {<uuid>}` line.
fn parse_vm_line(line: &str) -> Result<VirtualMachine> {
    let tokens = shell_words::split(line).map_err(|e| {
        HypervisorError::Parse(format!("cannot tokenize VM line [{}]: {}", line, e))
    })?;

    match tokens.as_slice() {
        [name, id] => Ok(VirtualMachine {
            name: name.clone(),
            id: id.trim_start_matches('{').trim_end_matches('}').to_string(),
        }),
        _ => Err(HypervisorError::Parse(format!(
            "expected VM name and id in line [{}], found {} field(s)",
            line,
            tokens.len()
        ))),
    }
}

/// Extract the snapshot listing from `showvminfo` output.
///
/// Collection starts after a line that is exactly `Snapshots:` (ignoring
/// surrounding whitespace) and stops at the first non-blank line after it
/// that is not a snapshot entry. Blank lines never end the block.
pub fn parse_snapshot_list(vm_id: &str, text: &str) -> SnapshotList {
    let mut snapshots = Vec::new();
    let mut in_snapshots = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed == SNAPSHOTS_MARKER {
            in_snapshots = true;
            continue;
        }

        if !in_snapshots {
            continue;
        }

        match SNAPSHOT_LINE.captures(line) {
            Some(caps) => snapshots.push(Snapshot {
                name: caps[1].to_string(),
                id: caps[2].to_string(),
                vm_id: vm_id.to_string(),
            }),
            None => break,
        }
    }

    SnapshotList::new(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names_and_ids(list: &SnapshotList) -> Vec<(String, String)> {
        list.iter().map(|s| (s.name.clone(), s.id.clone())).collect()
    }

    #[test]
    fn test_parse_vm_list() {
        let text = "\"web1\" {3e2f1c1e-8a55-4c1b-9a0e-2b0f4d7e9a11}\n\
                    \n\
                    \"db server\" {0b8f7b5e-5d3a-4f3e-bb0c-0d8d8c3f6a22}\n";

        let vms = parse_vm_list(text).unwrap();

        assert_eq!(
            vms,
            vec![
                VirtualMachine {
                    name: "web1".to_string(),
                    id: "3e2f1c1e-8a55-4c1b-9a0e-2b0f4d7e9a11".to_string(),
                },
                VirtualMachine {
                    name: "db server".to_string(),
                    id: "0b8f7b5e-5d3a-4f3e-bb0c-0d8d8c3f6a22".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_vm_list_empty() {
        assert!(parse_vm_list("").unwrap().is_empty());
        assert!(parse_vm_list("\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_vm_line_with_wrong_field_count() {
        let err = parse_vm_list("\"web1\"\n").unwrap_err();
        assert!(matches!(err, HypervisorError::Parse(_)));

        let err = parse_vm_list("\"web1\" {abc} extra\n").unwrap_err();
        assert!(matches!(err, HypervisorError::Parse(_)));
    }

    #[test]
    fn test_vm_line_with_unbalanced_quote() {
        let err = parse_vm_list("\"web1 {abc}\n").unwrap_err();
        assert!(matches!(err, HypervisorError::Parse(_)));
    }

    #[test]
    fn test_snapshot_block_with_blank_line_and_trailer() {
        let text = [
            "Snapshots:",
            "    Name: a (UUID: 1)",
            "",
            "    Name: b (UUID: 2)",
            "Storage Controllers:",
        ]
        .join("\n");

        let list = parse_snapshot_list("vm-1", &text);

        assert_eq!(
            names_and_ids(&list),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ]
        );
        assert!(list.iter().all(|s| s.vm_id == "vm-1"));
    }

    #[test]
    fn test_lines_before_marker_ignored() {
        let text = "Name:            web1\n\
                    Guest OS:        Ubuntu (64-bit)\n\
                    \x20   Name: stray (UUID: 0)\n\
                    Snapshots:\n\
                    \x20  Name: first (UUID: 11)\n";

        let list = parse_snapshot_list("vm-1", text);

        assert_eq!(names_and_ids(&list), vec![("first".to_string(), "11".to_string())]);
    }

    #[test]
    fn test_scan_stops_at_first_non_matching_line() {
        let text = "Snapshots:\n\
                    \x20  Name: one (UUID: 1)\n\
                    Description: something\n\
                    \x20  Name: two (UUID: 2)\n";

        let list = parse_snapshot_list("vm-1", text);

        assert_eq!(names_and_ids(&list), vec![("one".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_no_snapshot_marker() {
        let text = "Name: web1\nState: running\n";
        assert!(parse_snapshot_list("vm-1", text).is_empty());
    }

    #[test]
    fn test_snapshot_name_kept_verbatim() {
        let text = "Snapshots:\n   Name: 2024/01/01 03:00:00 (UUID: 9b7c) *\n";

        let list = parse_snapshot_list("vm-1", text);

        assert_eq!(
            names_and_ids(&list),
            vec![("2024/01/01 03:00:00".to_string(), "9b7c".to_string())]
        );
    }
}
