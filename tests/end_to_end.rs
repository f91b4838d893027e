use std::fmt::Write as _;
use std::path::Path;

use claim::{assert_ok, assert_some};
use fhs::basedir::{AppName, Dirs, PathKind};
use fhs::fs::path_ext::PathExt;
use fhs::os::{args::Args, env::Env};
use fhs::settings::{CONFIG_FILE_NAME, Loader, SettingSpec};
use tempfile::tempdir;

const APP: &str = "fhs-test";

fn env_for(root: &Path) -> Env {
    Env::from_iter(
        [
            ("XDG_CONFIG_HOME", "config"),
            ("XDG_DATA_HOME", "data"),
            ("XDG_CACHE_HOME", "cache"),
            ("XDG_RUNTIME_DIR", "runtime"),
            ("XDG_CONFIG_DIRS", "config-dirs"),
            ("XDG_DATA_DIRS", "data-dirs"),
        ]
        .map(|(key, dir)| (key, root.join(dir))),
    )
}

#[test]
fn settings_and_data_file() {
    let tmp = tempdir().expect("needed for tests");
    for dir in ["config", "data", "cache", "runtime", "config-dirs", "data-dirs"] {
        assert_ok!(std::fs::create_dir(tmp.path().join(dir)));
    }
    let config_file = tmp.path().join("config").join(APP).join(CONFIG_FILE_NAME);
    assert_ok!(config_file.write_creating_parents("verbose = false\nmod-test = 1.5\n"));
    let data_file = tmp.path().join("data").join(APP).join("test-data.txt");
    assert_ok!(data_file.write_creating_parents("This is test data"));

    let dirs = Dirs::new(env_for(tmp.path()), assert_ok!(AppName::new(APP)));
    let args = Args::new_from(["--test", "try this", "--num", "28"]);
    let specs = [
        SettingSpec::new("test", "something"),
        SettingSpec::new("go", Vec::<String>::new()),
        SettingSpec::new("num", 0),
        SettingSpec::new("verbose", true),
        SettingSpec::module("mod", "test", 1.0),
    ];
    let config = assert_ok!(Loader::new(&dirs, &args).load(&specs));

    let mut output = String::new();
    for spec in &specs {
        let value = assert_some!(config.get(spec.name()));
        assert_ok!(writeln!(output, "value of {} is {value}", spec.name()));
    }
    let found = assert_some!(assert_ok!(dirs.find(PathKind::Data, "test-data.txt")));
    let contents = assert_ok!(std::fs::read_to_string(found));
    assert_ok!(writeln!(output, "file contents: {contents}"));

    assert_eq!(
        output,
        "\
value of test is 'try this'
value of go is []
value of num is 28
value of verbose is False
value of mod-test is 1.5
file contents: This is test data
"
    );
}

#[test]
fn resolution_leaves_the_filesystem_alone() {
    let tmp = tempdir().expect("needed for tests");
    let dirs = Dirs::new(env_for(tmp.path()), assert_ok!(AppName::new(APP)));
    for kind in [PathKind::Config, PathKind::Data, PathKind::Cache, PathKind::Runtime] {
        let dir = assert_ok!(dirs.dir(kind));
        assert!(dir.starts_with(tmp.path()));
        assert!(dir.ends_with(APP));
    }
    assert_eq!(assert_ok!(std::fs::read_dir(tmp.path())).count(), 0);

    let cli = Args::new_from(["--saveconfig"]);
    assert_ok!(Loader::new(&dirs, &cli).load(&[SettingSpec::new("num", 0)]));
    let saved = tmp.path().join("config").join(APP).join(CONFIG_FILE_NAME);
    assert_eq!(assert_ok!(std::fs::read_to_string(saved)), "num = 0\n");
}
