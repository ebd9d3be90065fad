use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thpscope_core::memory::MemInfo;

const THP_COMPARE: &str = env!("CARGO_BIN_EXE_thp_compare");
const HUGETLB_PROBE: &str = env!("CARGO_BIN_EXE_hugetlb_probe");
const EXIT_TIMEOUT: Duration = Duration::from_secs(10);

fn thp_supported() -> bool {
    std::path::Path::new("/sys/kernel/mm/transparent_hugepage/enabled").exists()
}

fn wait_timeout(child: &mut Child, timeout: Duration) -> anyhow::Result<ExitStatus> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if start.elapsed() > timeout {
            child.kill()?;
            anyhow::bail!("process did not exit within {:?}", timeout);
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

fn spawn_thp_compare(args: &[&str]) -> anyhow::Result<Child> {
    Ok(Command::new(THP_COMPARE)
        .args(args)
        .env("RUST_LOG", "off")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?)
}

/// Reads stdout up to and including the PID line.
fn read_until_pid(stdout: &mut impl BufRead) -> anyhow::Result<Vec<String>> {
    let mut lines = vec![];
    loop {
        let mut line = String::new();
        if stdout.read_line(&mut line)? == 0 {
            anyhow::bail!("stdout closed before the PID line: {:?}", lines);
        }
        let line = line.trim_end().to_owned();
        let done = line.starts_with("PID: ");
        lines.push(line);
        if done {
            return Ok(lines);
        }
    }
}

fn terminate_after_summary(signal: libc::c_int) -> anyhow::Result<()> {
    let mut child = spawn_thp_compare(&["--size-mb", "4"])?;
    let mut stdout = BufReader::new(child.stdout.take().expect("piped stdout"));
    let lines = read_until_pid(&mut stdout)?;
    assert_eq!(
        lines[..5],
        [
            "Memory allocated and madvise applied.",
            "Mapping summary:",
            "  [1] hugepage_mem: MADV_HUGEPAGE applied",
            "  [2] nohugepage_mem: MADV_NOHUGEPAGE applied",
            "  [3] default_mem: no madvise",
        ]
    );
    assert_eq!(lines[5], format!("PID: {} - send SIGINT (Ctrl+C) or SIGTERM to exit.", child.id()));

    assert_eq!(unsafe { libc::kill(child.id() as libc::pid_t, signal) }, 0);
    let status = wait_timeout(&mut child, EXIT_TIMEOUT)?;
    assert!(status.success(), "exit status {:?}", status);

    let mut rest = String::new();
    stdout.read_to_string(&mut rest)?;
    assert!(rest.contains("Received termination signal, cleaning up..."));
    assert!(rest.trim_end().ends_with("Memory unmapped, exiting."));
    Ok(())
}

#[test]
fn thp_compare_exits_cleanly_on_sigterm() -> anyhow::Result<()> {
    if !thp_supported() {
        return Ok(());
    }
    terminate_after_summary(libc::SIGTERM)
}

#[test]
fn thp_compare_exits_cleanly_on_sigint() -> anyhow::Result<()> {
    if !thp_supported() {
        return Ok(());
    }
    terminate_after_summary(libc::SIGINT)
}

#[test]
fn thp_compare_treats_sighup_as_termination() -> anyhow::Result<()> {
    if !thp_supported() {
        return Ok(());
    }
    terminate_after_summary(libc::SIGHUP)
}

#[test]
fn thp_compare_fails_on_invalid_size() -> anyhow::Result<()> {
    let mut child = spawn_thp_compare(&["--size-mb", "0"])?;
    let status = wait_timeout(&mut child, EXIT_TIMEOUT)?;
    assert_eq!(status.code(), Some(1));
    let mut out = String::new();
    child.stdout.take().expect("piped stdout").read_to_string(&mut out)?;
    assert!(!out.contains("Mapping summary"));
    Ok(())
}

#[test]
fn thp_compare_fails_on_overflowing_size() -> anyhow::Result<()> {
    let size_mb = (usize::MAX / 2).to_string();
    let mut child = spawn_thp_compare(&["--size-mb", &size_mb])?;
    let status = wait_timeout(&mut child, EXIT_TIMEOUT)?;
    assert_eq!(status.code(), Some(1));
    Ok(())
}

fn spawn_hugetlb_probe(args: &[&str], stdin: Stdio) -> anyhow::Result<Child> {
    Ok(Command::new(HUGETLB_PROBE)
        .args(args)
        .env("RUST_LOG", "off")
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?)
}

#[test]
fn hugetlb_probe_fails_when_pool_is_too_small() -> anyhow::Result<()> {
    // 1 TB of 2 MB pages
    let mut child = spawn_hugetlb_probe(
        &["--pages", "524288", "--page-size-mb", "2"],
        Stdio::null(),
    )?;
    let status = wait_timeout(&mut child, EXIT_TIMEOUT)?;
    assert_eq!(status.code(), Some(1));
    let mut out = String::new();
    child.stdout.take().expect("piped stdout").read_to_string(&mut out)?;
    assert!(!out.contains("Mapped"));
    Ok(())
}

#[test]
fn hugetlb_probe_rejects_zero_pages() -> anyhow::Result<()> {
    let mut child = spawn_hugetlb_probe(&["--pages", "0", "--page-size-mb", "2"], Stdio::null())?;
    let status = wait_timeout(&mut child, EXIT_TIMEOUT)?;
    assert_eq!(status.code(), Some(1));
    Ok(())
}

#[test]
fn hugetlb_probe_fails_on_overflowing_sizes() -> anyhow::Result<()> {
    let huge = (usize::MAX / 2).to_string();
    for args in [
        ["--pages", "1", "--page-size-mb", huge.as_str()],
        ["--pages", huge.as_str(), "--page-size-mb", "2"],
    ] {
        let mut child = spawn_hugetlb_probe(&args, Stdio::null())?;
        let status = wait_timeout(&mut child, EXIT_TIMEOUT)?;
        assert_eq!(status.code(), Some(1), "args {:?}", args);
    }
    Ok(())
}

/// Default huge page size in MB if the pool can serve both probe tests at once.
fn available_pool() -> Option<usize> {
    let info = MemInfo::read().ok()?;
    let page_size = info.hugepage_size?;
    (info.available()? >= 2).then(|| page_size.bytes() >> 20)
}

#[test]
fn hugetlb_probe_exits_after_empty_line() -> anyhow::Result<()> {
    let Some(page_size_mb) = available_pool() else {
        return Ok(());
    };
    let page_size_mb = page_size_mb.to_string();
    let mut child = spawn_hugetlb_probe(
        &["--pages", "1", "--page-size-mb", &page_size_mb],
        Stdio::piped(),
    )?;
    let mut stdout = BufReader::new(child.stdout.take().expect("piped stdout"));
    let lines = read_until_pid(&mut stdout)?;
    assert!(lines[0].starts_with("Mapped "));

    let mut stdin = child.stdin.take().expect("piped stdin");
    stdin.write_all(b"\n")?;
    drop(stdin);
    let status = wait_timeout(&mut child, EXIT_TIMEOUT)?;
    assert!(status.success(), "exit status {:?}", status);

    let mut rest = String::new();
    stdout.read_to_string(&mut rest)?;
    assert_eq!(rest.trim_end(), "Memory unmapped, exiting.");
    Ok(())
}

#[test]
fn hugetlb_probe_exits_on_closed_stdin() -> anyhow::Result<()> {
    let Some(page_size_mb) = available_pool() else {
        return Ok(());
    };
    let page_size_mb = page_size_mb.to_string();
    let mut child = spawn_hugetlb_probe(
        &["--pages", "1", "--page-size-mb", &page_size_mb],
        Stdio::null(),
    )?;
    let status = wait_timeout(&mut child, EXIT_TIMEOUT)?;
    assert!(status.success(), "exit status {:?}", status);
    Ok(())
}
