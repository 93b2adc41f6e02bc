// Drives the compiled binary through a PTY: answer one question, finish,
// confirm and quit from the results screen.
//
// Requires a TTY, so it is Unix-only and ignored by default.
// Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

mod common;

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bank = common::write_bank(dir.path());

    let bin = assert_cmd::cargo::cargo_bin("drillq");
    let cmd = format!(
        "env HOME={} {} --bank {} -s Botany -n 2 --no-history",
        dir.path().display(),
        bin.display(),
        bank.display()
    );

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(300));

    p.send("b")?;
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(100));

    p.send("f")?;
    p.send("y")?;
    std::thread::sleep(Duration::from_millis(100));

    p.send("q")?;
    p.expect(Eof)?;
    Ok(())
}
