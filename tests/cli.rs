//! CLI tests: run the compiled `hexo-admin` binary against temp sites.
//!
//! Run with: `cargo test --test cli`

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("source/_posts")).unwrap();
    fs::write(tmp.path().join("_config.yml"), "title: Test Blog\n").unwrap();
    tmp
}

fn hexo_admin(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hexo-admin"))
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("failed to run hexo-admin")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "stdout is not JSON ({err}): {}\nstderr: {}",
            stdout(output),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[test]
fn new_post_then_list() {
    let site = site();
    let created = hexo_admin(site.path(), &["posts", "new", "Hello World"]);
    assert!(created.status.success());
    assert_eq!(stdout(&created).trim(), "Created Hello World.md");

    let listed = hexo_admin(site.path(), &["--json", "posts", "list"]);
    assert!(listed.status.success());
    let listing = json(&listed);
    let entries = listing["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["filename"], "Hello World.md");
    assert_eq!(entries[0]["title"], "Hello World");

    let raw = fs::read_to_string(site.path().join("source/_posts/Hello World.md")).unwrap();
    assert!(raw.starts_with("---\ntitle: Hello World\n"));
    assert!(raw.contains("layout: post\n"));
}

#[test]
fn creating_same_title_twice_fails() {
    let site = site();
    assert!(hexo_admin(site.path(), &["posts", "new", "T"]).status.success());

    let second = hexo_admin(site.path(), &["--json", "posts", "new", "T"]);
    assert!(!second.status.success());
    assert_eq!(json(&second)["kind"], "already_exists");
}

#[test]
fn save_replaces_post_from_file() {
    let site = site();
    let doc = site.path().join("edit.md");
    fs::write(&doc, "---\ntitle: Edited\ntags: [a]\n---\nNew body\n").unwrap();

    let saved = hexo_admin(
        site.path(),
        &["posts", "save", "post.md", "--file", doc.to_str().unwrap()],
    );
    assert!(saved.status.success());

    let shown = hexo_admin(site.path(), &["--json", "posts", "show", "post.md"]);
    let post = json(&shown);
    assert_eq!(post["data"]["title"], "Edited");
    assert_eq!(post["content"], "New body\n");
}

#[test]
fn show_missing_post_is_not_found() {
    let site = site();
    let shown = hexo_admin(site.path(), &["--json", "posts", "show", "ghost.md"]);
    assert!(!shown.status.success());
    assert_eq!(json(&shown)["kind"], "not_found");
}

#[test]
fn stats_counts_distinct_terms() {
    let site = site();
    let posts = site.path().join("source/_posts");
    fs::write(posts.join("a.md"), "---\ntags: x\n---\n").unwrap();
    fs::write(posts.join("b.md"), "---\ntags: [x, y]\ncategories: dev\n---\n").unwrap();

    let stats = json(&hexo_admin(site.path(), &["--json", "stats"]));
    assert_eq!(stats["posts"], 2);
    assert_eq!(stats["tags"], 2);
    assert_eq!(stats["categories"], 1);
}

// ---------------------------------------------------------------------------
// Config, media
// ---------------------------------------------------------------------------

#[test]
fn config_show_and_save() {
    let site = site();
    let doc = site.path().join("theme.yml");
    fs::write(&doc, "darkmode: true\n").unwrap();

    let saved = hexo_admin(
        site.path(),
        &["config", "save", "theme", "--file", doc.to_str().unwrap()],
    );
    assert!(saved.status.success());

    let configs = json(&hexo_admin(site.path(), &["--json", "config", "show"]));
    assert_eq!(configs["site"]["parsed"]["title"], "Test Blog");
    assert_eq!(configs["theme"]["parsed"]["darkmode"], true);
    assert_eq!(configs["theme"]["raw"], "darkmode: true\n");
}

#[test]
fn config_save_unknown_target_fails() {
    let site = site();
    let saved = hexo_admin(site.path(), &["config", "save", "plugins", "--file", "x"]);
    assert!(!saved.status.success());
    assert!(String::from_utf8_lossy(&saved.stderr).contains("Unknown config target"));
}

#[test]
fn media_upload_then_list() {
    let site = site();
    let file = site.path().join("photo.PNG");
    fs::write(&file, b"\x89PNG").unwrap();

    let uploaded = json(&hexo_admin(
        site.path(),
        &["--json", "media", "upload", file.to_str().unwrap()],
    ));
    assert_eq!(uploaded["url"], "/image/photo.PNG");

    let listed = json(&hexo_admin(site.path(), &["--json", "media", "list"]));
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["photo.PNG"]);
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[test]
fn build_rejects_unknown_operation() {
    let site = site();
    let built = hexo_admin(site.path(), &["--json", "build", "publish"]);
    assert!(!built.status.success());
    assert_eq!(json(&built)["kind"], "invalid_operation");
}

#[cfg(unix)]
#[test]
fn build_runs_configured_command_in_site_root() {
    let site = site();
    fs::write(
        site.path().join("admin.toml"),
        "[build]\ncommand = [\"sh\", \"-c\", \"echo ran $0 in $(basename \\\"$PWD\\\")\"]\n",
    )
    .unwrap();
    let dir_name = site.path().file_name().unwrap().to_str().unwrap().to_string();

    let built = hexo_admin(site.path(), &["build", "clean"]);
    assert!(built.status.success());
    let out = stdout(&built);
    assert!(out.contains(&format!("ran clean in {dir_name}")), "stdout: {out}");
    assert!(out.contains("==> clean complete"));
}

#[cfg(unix)]
#[test]
fn build_failure_reports_stderr() {
    let site = site();
    fs::write(
        site.path().join("admin.toml"),
        "[build]\ncommand = [\"sh\", \"-c\", \"echo broken theme >&2; exit 3\"]\n",
    )
    .unwrap();

    let built = hexo_admin(site.path(), &["--json", "build", "generate"]);
    assert!(!built.status.success());
    let failure = json(&built);
    assert_eq!(failure["kind"], "external_process");
    assert_eq!(failure["details"]["exit_code"], 3);
    assert_eq!(failure["details"]["stderr"], "broken theme\n");
}

// ---------------------------------------------------------------------------
// Playlist, gen-config
// ---------------------------------------------------------------------------

#[test]
fn playlist_writes_music_json() {
    let site = site();
    let music = site.path().join("source/music");
    fs::create_dir_all(&music).unwrap();
    fs::write(music.join("Interstellar - Hans Zimmer.mp3"), b"").unwrap();
    fs::write(music.join("Interstellar - Hans Zimmer.jpg"), b"").unwrap();
    fs::write(music.join("Solo.mp3"), b"").unwrap();

    let generated = hexo_admin(site.path(), &["playlist"]);
    assert!(generated.status.success());
    assert!(stdout(&generated).contains("Wrote 2 tracks"));

    let written = fs::read_to_string(site.path().join("source/json/music.json")).unwrap();
    let tracks: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(tracks[0]["name"], "Interstellar");
    assert_eq!(tracks[0]["cover"], "/music/Interstellar - Hans Zimmer.jpg");
    assert_eq!(tracks[1]["name"], "Solo");
    assert_eq!(tracks[1]["artist"], "Unknown");
}

#[test]
fn playlist_without_music_dir_fails() {
    let site = site();
    let generated = hexo_admin(site.path(), &["playlist"]);
    assert!(!generated.status.success());
    assert!(String::from_utf8_lossy(&generated.stderr).contains("Music directory not found"));
}

#[test]
fn gen_config_prints_stock_toml_even_with_broken_admin_toml() {
    let site = site();
    fs::write(site.path().join("admin.toml"), "not [valid").unwrap();
    let printed = hexo_admin(site.path(), &["gen-config"]);
    assert!(printed.status.success());
    let text = stdout(&printed);
    assert!(text.contains("[posts]"));
    assert!(text.contains("command = [\"hexo\"]"));
}
