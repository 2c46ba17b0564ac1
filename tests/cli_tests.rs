#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn timetable_for_one_day() {
    cli()
        .write_stdin("jadwal Senin\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Psikologi Agama"))
        .stdout(predicate::str::contains("ustadzah Niha"))
        .stdout(predicate::str::contains("Fathul Mu'in").not());
}

#[test]
fn records_and_rejects_the_same_slot_twice() {
    cli()
        .write_stdin(
            "absen 2025-03-03 pagi Alpa\n\
             absen 2025-03-03 pagi Sakit\n\
             stats 2025 3\n\
             quit\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Stored Alpa for 2025-03-03 Pagi (Psikologi Agama).",
        ))
        .stdout(predicate::str::contains("https://wa.me/6282229910627"))
        .stdout(predicate::str::contains(
            "user local already recorded the morning session on 2025-03-03",
        ))
        .stdout(predicate::str::contains(
            "Maret 2025: hadir=0 izin=0 sakit=0 alpa=1 total=1 kehadiran=0%",
        ));
}

#[test]
fn present_requires_a_photo_url() {
    cli()
        .write_stdin(
            "absen 2025-03-04 malam Hadir\n\
             absen 2025-03-04 malam Hadir https://cdn.test/bukti.jpg tepat waktu\n\
             riwayat 2025-03\n\
             quit\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("requires a photo"))
        .stdout(predicate::str::contains("Stored Hadir for 2025-03-04 Malam"))
        .stdout(predicate::str::contains("tepat waktu"));
}

#[test]
fn photo_urls_without_extension_or_with_query_are_accepted() {
    cli()
        .arg("--user")
        .arg("u9")
        .write_stdin(
            "absen 2025-03-04 malam Hadir https://cdn.test/bukti\n\
             absen 2025-03-05 malam Hadir https://cdn.test/a.png?token=1\n\
             quit\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored Hadir for 2025-03-04 Malam"))
        .stdout(predicate::str::contains("Stored Hadir for 2025-03-05 Malam"))
        .stdout(predicate::str::is_match(r"attendance-proofs/u9/2025-03/\d+\.jpg").unwrap())
        .stdout(predicate::str::is_match(r"attendance-proofs/u9/2025-03/\d+\.png\s").unwrap());
}

#[test]
fn xlsx_export_keeps_rows_with_plain_photo_names() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("riwayat.xlsx");
    let input = format!(
        "absen 2025-03-04 malam Hadir bukti.jpg\nexport xlsx {} 2025-03\nquit\n",
        path.display()
    );
    cli()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 records to"))
        .stdout(predicate::str::contains("xlsx error").not());
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn exports_month_to_csv() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("maret.csv");
    let input = format!(
        "absen 2025-03-05 pagi Izin\nexport csv {} 2025-03\nquit\n",
        path.display()
    );
    cli()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Exported 1 records to",
        ))
        .stdout(predicate::str::contains("riwayat-absensi-2025-03.csv"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with('\u{FEFF}'));
    assert!(text.contains("\"05/03/2025\",\"Pagi\",\"Rabu\",\"Filsafat Ilmu\""));
}

#[test]
fn empty_year_recap_and_unknown_command() {
    cli()
        .write_stdin("rekap 2019\nterbang\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Belum ada rekap absensi untuk tahun 2019.",
        ))
        .stdout(predicate::str::contains("Unknown command 'terbang'"));
}

#[test]
fn invalid_config_exits_with_code_two() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "utc_offset_hours": 99 }"#).unwrap();
    cli()
        .arg("--config")
        .arg(&path)
        .write_stdin("quit\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Config error"));
}
