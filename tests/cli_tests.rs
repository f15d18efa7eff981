use assert_cmd::prelude::*;
use chrono::{Duration, Local};
use predicates::prelude::*;
use shelter::trend::TrendPoint;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn shelter_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("shelter"))
}

fn init_data_dir(temp_dir: &TempDir) -> PathBuf {
    let data_path = temp_dir.path().join("shelter-data");
    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "init"])
        .assert()
        .success();
    data_path
}

fn record(data_path: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "record"])
        .args(args)
        .assert()
}

fn trend_json(cmd: &mut Command) -> Vec<TrendPoint> {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_help() {
    shelter_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shelter inventory ledger"));
}

#[test]
fn test_version() {
    shelter_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shelter"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("shelter-data");

    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized shelter data"));

    assert!(data_path.join("config.toml").exists());
    assert!(data_path.join("items.toml").exists());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);

    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("nonexistent");

    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_items_list() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);

    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "items"])
        .assert()
        .success()
        .stdout(predicate::str::contains("blankets"))
        .stdout(predicate::str::contains("Wool Blankets"))
        .stdout(predicate::str::contains("active"));
}

#[test]
fn test_record_updates_on_hand() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);

    record(&data_path, &["--item", "blankets", "--kind", "in", "--quantity", "20"])
        .success()
        .stdout(predicate::str::contains("Recorded IN 20 each of Wool Blankets"))
        .stdout(predicate::str::contains("On hand: 20"));

    record(&data_path, &["--item", "blankets", "--kind", "out", "--quantity", "5"])
        .success()
        .stdout(predicate::str::contains("On hand: 15"));

    record(&data_path, &["--item", "blankets", "--kind", "adjust", "--quantity", "1.5"])
        .success()
        .stdout(predicate::str::contains("On hand: 16.50"));

    let ledger = fs::read_to_string(data_path.join("ledger.toml")).unwrap();
    assert!(ledger.contains("type = \"ADJUST\""));
}

#[test]
fn test_record_rejects_overdraw() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);

    record(&data_path, &["--item", "blankets", "--kind", "in", "--quantity", "2"]).success();
    record(&data_path, &["--item", "blankets", "--kind", "out", "--quantity", "3"])
        .failure()
        .stderr(predicate::str::contains("Not enough stock"));
}

#[test]
fn test_record_unknown_item() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);

    record(&data_path, &["--item", "tents", "--kind", "in", "--quantity", "2"])
        .failure()
        .stderr(predicate::str::contains("not found in items.toml"));
}

#[test]
fn test_record_invalid_quantity() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);

    record(&data_path, &["--item", "blankets", "--kind", "in", "--quantity", "0"])
        .failure()
        .stderr(predicate::str::contains("must be greater than 0"));
}

#[test]
fn test_record_invalid_date() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);

    record(
        &data_path,
        &["--item", "blankets", "--kind", "in", "--quantity", "1", "--date", "01/02/2024"],
    )
    .failure()
    .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_history_lists_newest_first() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);

    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No transactions recorded yet."));

    record(&data_path, &["--item", "blankets", "--kind", "in", "--quantity", "4"]).success();
    record(
        &data_path,
        &["--item", "canned-beans", "--kind", "in", "--quantity", "9", "--note", "food drive"],
    )
    .success();

    let output = shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "history"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("food drive"));
    assert!(stdout.find("canned-beans").unwrap() < stdout.find("blankets").unwrap());

    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "history", "--item", "blankets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("canned-beans").not());
}

#[test]
fn test_status() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);

    record(&data_path, &["--item", "blankets", "--kind", "in", "--quantity", "3"]).success();

    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shelter Status"))
        .stdout(predicate::str::contains("Your Shelter Name"))
        .stdout(predicate::str::contains("Transactions:     1"))
        .stdout(predicate::str::contains("Total on hand:    3"));
}

#[test]
fn test_trend_from_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);
    let two_days_ago = (Local::now().date_naive() - Duration::days(2))
        .format("%Y-%m-%d")
        .to_string();

    record(
        &data_path,
        &["--item", "blankets", "--kind", "in", "--quantity", "20", "--date", &two_days_ago],
    )
    .success();
    record(&data_path, &["--item", "blankets", "--kind", "out", "--quantity", "5"]).success();

    let series = trend_json(shelter_cmd().args([
        "-C",
        data_path.to_str().unwrap(),
        "trend",
        "--item",
        "blankets",
        "--range",
        "week",
        "--json",
    ]));

    assert_eq!(series.len(), 7);
    let last = series.last().unwrap();
    assert_eq!(last.on_hand, 15.0);
    assert_eq!(last.total_out, 5.0);
    assert_eq!(series[4].total_in, 20.0);
    assert_eq!(series[4].on_hand, 20.0);
    assert_eq!(series[3].on_hand, 0.0);
}

#[test]
fn test_trend_unknown_item() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);

    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "trend", "--item", "tents"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in items.toml"));
}

#[test]
fn test_trend_from_export_file() {
    let temp_dir = TempDir::new().unwrap();
    let export = temp_dir.path().join("transactions.json");
    fs::write(
        &export,
        r#"[
            {"type": "IN", "quantity": 5, "created_at": "2024-01-06T10:00:00Z", "item_id": "a"},
            {"type": "OUT", "quantity": 2, "created_at": "2024-01-07T18:00:00Z", "item_id": "a"},
            {"type": "ADJUST", "quantity": 4, "created_at": "2024-01-03", "item_id": "b"},
            {"type": "IN", "quantity": 99, "created_at": "2023-06-01", "item_id": "a"},
            {"type": "IN", "quantity": "oops", "created_at": "2024-01-05", "item_id": "a"},
            {"type": "IN", "quantity": 7, "created_at": "garbage", "item_id": "a"}
        ]"#,
    )
    .unwrap();
    let no_data_dir = temp_dir.path().join("unused");

    let series = trend_json(shelter_cmd().args([
        "-C",
        no_data_dir.to_str().unwrap(),
        "trend",
        "--transactions",
        export.to_str().unwrap(),
        "--on-hand",
        "10",
        "--as-of",
        "2024-01-07",
        "--timezone",
        "utc",
        "--range",
        "week",
        "--json",
    ]));

    let on_hand: Vec<f64> = series.iter().map(|p| p.on_hand).collect();
    assert_eq!(on_hand, vec![3.0, 3.0, 7.0, 7.0, 7.0, 12.0, 10.0]);
    assert_eq!(series[0].day.to_string(), "2024-01-01");
    assert_eq!(series[2].total_in, 4.0);

    let series = trend_json(shelter_cmd().args([
        "-C",
        no_data_dir.to_str().unwrap(),
        "trend",
        "--transactions",
        export.to_str().unwrap(),
        "--on-hand",
        "10",
        "--as-of",
        "2024-01-07",
        "--timezone",
        "utc",
        "--range",
        "week",
        "--item",
        "b",
        "--json",
    ]));
    assert_eq!(series.iter().map(|p| p.total_in).sum::<f64>(), 4.0);
}

#[test]
fn test_trend_table_flags_negative_days() {
    let temp_dir = TempDir::new().unwrap();
    let export = temp_dir.path().join("transactions.json");
    fs::write(
        &export,
        r#"[{"type": "IN", "quantity": 10, "created_at": "2024-01-07"}]"#,
    )
    .unwrap();

    shelter_cmd()
        .args([
            "-C",
            temp_dir.path().join("unused").to_str().unwrap(),
            "trend",
            "--transactions",
            export.to_str().unwrap(),
            "--on-hand",
            "4",
            "--as-of",
            "2024-01-07",
            "--range",
            "week",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("On-hand trend for all items (week)"))
        .stdout(predicate::str::contains("-6 !"))
        .stdout(predicate::str::contains("Net change:      +10"))
        .stdout(predicate::str::contains("negative on 6 day(s), starting 2024-01-01"));
}

#[test]
fn test_trend_export_requires_on_hand() {
    let temp_dir = TempDir::new().unwrap();
    let export = temp_dir.path().join("transactions.json");
    fs::write(&export, "[]").unwrap();

    shelter_cmd()
        .args(["trend", "--transactions", export.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--on-hand"));
}

#[test]
fn test_trend_bad_export_file() {
    let temp_dir = TempDir::new().unwrap();
    let export = temp_dir.path().join("transactions.json");
    fs::write(&export, "{not json").unwrap();

    shelter_cmd()
        .args([
            "-C",
            temp_dir.path().join("unused").to_str().unwrap(),
            "trend",
            "--transactions",
            export.to_str().unwrap(),
            "--on-hand",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse transactions file"));
}

#[test]
fn test_trend_invalid_timezone() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);

    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "trend", "--timezone", "mars"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time zone"));
}

#[test]
fn test_trend_export_skips_rows_with_null_fields() {
    let temp_dir = TempDir::new().unwrap();
    let export = temp_dir.path().join("transactions.json");
    fs::write(
        &export,
        r#"[
            {"type": "IN", "quantity": 2, "created_at": null},
            {"type": "IN", "quantity": 2, "created_at": 1704585600},
            {"type": null, "quantity": 2, "created_at": "2024-01-07"},
            {"type": "IN", "quantity": 3, "created_at": "2024-01-07", "item_id": null}
        ]"#,
    )
    .unwrap();

    let series = trend_json(shelter_cmd().args([
        "-C",
        temp_dir.path().join("unused").to_str().unwrap(),
        "trend",
        "--transactions",
        export.to_str().unwrap(),
        "--on-hand",
        "10",
        "--as-of",
        "2024-01-07",
        "--range",
        "week",
        "--json",
    ]));

    assert_eq!(series.len(), 7);
    assert_eq!(series.iter().map(|p| p.total_in).sum::<f64>(), 3.0);
    assert_eq!(series[5].on_hand, 7.0);
    assert_eq!(series[6].on_hand, 10.0);
}

#[test]
fn test_trend_all_items_ignores_inactive_stock() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = init_data_dir(&temp_dir);
    let two_days_ago = (Local::now().date_naive() - Duration::days(2))
        .format("%Y-%m-%d")
        .to_string();

    record(
        &data_path,
        &["--item", "blankets", "--kind", "in", "--quantity", "5", "--date", &two_days_ago],
    )
    .success();
    record(
        &data_path,
        &["--item", "hygiene-kits", "--kind", "in", "--quantity", "100", "--date", &two_days_ago],
    )
    .success();

    fs::write(
        data_path.join("items.toml"),
        r#"[blankets]
name = "Wool Blankets"
unit = "each"

[hygiene-kits]
name = "Hygiene Kits"
unit = "kit"
active = false
"#,
    )
    .unwrap();

    let series = trend_json(shelter_cmd().args([
        "-C",
        data_path.to_str().unwrap(),
        "trend",
        "--range",
        "week",
        "--json",
    ]));

    assert_eq!(series.last().unwrap().on_hand, 5.0);
    assert_eq!(series[4].total_in, 5.0);
    assert_eq!(series[3].on_hand, 0.0);
    assert!(series.iter().all(|p| p.on_hand >= 0.0));

    shelter_cmd()
        .args(["-C", data_path.to_str().unwrap(), "trend", "--range", "week"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning").not());
}
