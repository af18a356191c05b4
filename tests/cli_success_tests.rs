//! End-to-end success path of the `vid2gif` binary
//!
//! The three tools are small shell scripts, so nothing beyond `sh` is needed.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

const FFPROBE: &str = r#"#!/bin/sh
printf '%s' '{"streams":[{"width":640,"height":360,"nb_read_packets":"24"}],"packets":[{"pts_time":"0.000000"},{"pts_time":"2.000000"}]}'
"#;

// Writes three frames next to the output template given as the last argument
const FFMPEG: &str = r#"#!/bin/sh
for last; do :; done
dir=$(dirname "$last")
for i in 1 2 3; do
  : > "$dir/frame-0000000$i.png"
  printf 'frame=%s\nprogress=continue\n' "$i"
done
printf 'progress=end\n'
"#;

const GIFSKI: &str = r#"#!/bin/sh
out=""
frames=0
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    frame-*.png) [ -f "$1" ] && frames=$((frames + 1)) ;;
  esac
  shift
done
[ "$frames" -eq 3 ] || { echo "expected 3 frames, got $frames" >&2; exit 1; }
printf 'Frame 3 / 3\n'
printf 'GIF89a' > "$out"
"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_successful_run_prints_only_the_output_path() {
    let workdir = TempDir::new().unwrap();
    let tools = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();

    let ffprobe = write_script(tools.path(), "ffprobe", FFPROBE);
    let ffmpeg = write_script(tools.path(), "ffmpeg", FFMPEG);
    let gifski = write_script(tools.path(), "gifski", GIFSKI);

    Command::cargo_bin("vid2gif")
        .unwrap()
        .current_dir(workdir.path())
        .env_remove("VID2GIF_CONFIG")
        .env_remove("RUST_LOG")
        .env("TMPDIR", scratch.path())
        .env("VID2GIF_FFPROBE", &ffprobe)
        .env("VID2GIF_FFMPEG", &ffmpeg)
        .env("VID2GIF_GIFSKI", &gifski)
        .arg("clip.mp4")
        .assert()
        .code(0)
        .stdout("./clip.gif\n");

    assert_eq!(fs::read(workdir.path().join("clip.gif")).unwrap(), b"GIF89a");
    // The working directory was created under TMPDIR and removed again
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}
