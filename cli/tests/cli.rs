use assert_cmd::Command;
use predicates::prelude::*;

fn talecraft() -> Command {
    Command::cargo_bin("talecraft").unwrap()
}

#[test]
fn seeded_roll_prints_tagged_lines() {
    talecraft()
        .args(["roll", "--seed", "3", "--rolls", "2", "--die", "d8"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[ROLL][d8] d8="))
        .stdout(predicate::str::contains("\n[ROLL][d8]"));
}

#[test]
fn new_then_play_updates_the_save() {
    let dir = tempfile::tempdir().unwrap();
    let save = dir.path().join("save.json");
    let save = save.to_str().unwrap();

    talecraft()
        .args(["new", "--save", save, "--name", "Lucas", "--attr", "influence=9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lucas the seeker (level 1"))
        .stdout(predicate::str::contains("quest main_mystery"));

    talecraft()
        .args(["play", "--save", save, "--encounter", "st_flickering_lights", "--choice", "run_home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[OUTCOME][st_flickering_lights] run_home → default"));

    talecraft()
        .args(["status", "--save", save])
        .assert()
        .success()
        .stdout(predicate::str::contains("health"));
}

#[test]
fn overspent_attributes_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let save = dir.path().join("save.json");
    talecraft()
        .args(["new", "--save", save.to_str().unwrap(), "--name", "Max", "--attr", "vision=10", "--attr", "wisdom=10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("create character"));
}

#[test]
fn directive_file_with_bom_is_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("turn.txt");
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"The lights flicker.\n[DICE_CHECK: vision DC:13]\n");
    std::fs::write(&file, bytes).unwrap();

    talecraft()
        .args(["directive", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""attribute": "vision""#))
        .stdout(predicate::str::contains(r#""text": "The lights flicker.""#));
}

#[test]
fn lookup_unknown_key_fails() {
    talecraft().args(["lookup", "era", "medieval"]).assert().success();
    talecraft()
        .args(["lookup", "era", "atlantis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("atlantis"));
}

#[test]
fn simulate_choice_reports_a_rate() {
    Command::cargo_bin("simulate-choice")
        .unwrap()
        .args(["--encounter", "st_meet_dustin", "--choice", "share_info", "--trials", "200", "--score", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("success_rate="))
        .stdout(predicate::str::contains("check attribute=influence score=9"));
}
