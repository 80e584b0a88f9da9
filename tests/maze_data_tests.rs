use maze_traverse::adapters::outbound::{FilesystemMazeSource, BUILTIN_LAYOUT};
use maze_traverse::domains::maze::{MazeGrid, MazeLayoutSource};
use tempfile::tempdir;

#[test]
fn test_save_load_and_list_layouts() {
    let dir = tempdir().unwrap();
    let source = FilesystemMazeSource::new(Some(dir.path().join("mazes")));

    source.save_layout("corridor", "*****\n*P  *\n*****\n").unwrap();
    source.save_layout("default", BUILTIN_LAYOUT).unwrap();

    let loaded = source.load_layout("corridor").unwrap();
    assert!(loaded.contains("*P  *"));
    assert_eq!(source.list_layouts().unwrap(), vec!["corridor", "default"]);
}

#[test]
fn test_missing_layout_is_an_infrastructure_error() {
    let dir = tempdir().unwrap();
    let source = FilesystemMazeSource::new(Some(dir.path().to_path_buf()));
    assert!(matches!(
        source.load_layout("absent"),
        Err(maze_traverse::DomainError::Infrastructure(_))
    ));
}

#[test]
fn test_bundled_layouts_parse() {
    let base = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/mazes");
    let source = FilesystemMazeSource::new(Some(base));
    for name in source.list_layouts().unwrap() {
        let layout = source.load_layout(&name).unwrap();
        let grid = MazeGrid::parse(&layout, '*', 100.0).unwrap();
        assert!(grid.free_cell_count() > 1, "layout {} has no room to plan", name);
    }
    assert!(MazeGrid::parse(BUILTIN_LAYOUT, '*', 100.0).is_ok());
}
