//! A minimal directory browser that reports selections to the controller.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::event::AppEvent;
use crate::format::is_encrypted;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// Extension is on the allow list (always `false` for directories).
    pub allowed: bool,
    /// Best-effort marker check; unreadable files count as not encrypted.
    pub encrypted: bool,
}

/// What activating the entry under the cursor produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Selected(PathBuf),
    Rejected(PathBuf),
}

impl From<Selection> for AppEvent {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::Selected(path) => AppEvent::FileSelected(path),
            Selection::Rejected(path) => AppEvent::FileRejected(path),
        }
    }
}

#[derive(Debug)]
pub struct FileBrowser {
    dir: PathBuf,
    entries: Vec<Entry>,
    cursor: usize,
    config: Config,
}

impl FileBrowser {
    /// Open the browser at `config.start_dir`.
    pub fn new(config: &Config) -> io::Result<Self> {
        let dir = fs::canonicalize(&config.start_dir)?;
        let mut browser = Self {
            dir,
            entries: Vec::new(),
            cursor: 0,
            config: config.clone(),
        };
        browser.refresh()?;
        Ok(browser)
    }

    /// Re-read the current directory, keeping the cursor on the same name if possible.
    pub fn refresh(&mut self) -> io::Result<()> {
        let previous = self.selected().map(|e| e.name.clone());
        self.entries = self.read_entries()?;
        self.cursor = previous
            .and_then(|name| self.entries.iter().position(|e| e.name == name))
            .unwrap_or(0);
        Ok(())
    }

    fn read_entries(&self) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for dirent in fs::read_dir(&self.dir)? {
            let dirent = dirent?;
            let name = dirent.file_name().to_string_lossy().into_owned();
            if !self.config.show_hidden && name.starts_with('.') {
                continue;
            }
            let path = dirent.path();
            // Follow symlinks so a link to a directory behaves like one.
            let is_dir = fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);
            let allowed = !is_dir && self.config.allows(&path);
            let encrypted = !is_dir && is_encrypted(&path).unwrap_or(false);
            entries.push(Entry {
                name,
                path,
                is_dir,
                allowed,
                encrypted,
            });
        }
        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        Ok(entries)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&Entry> {
        self.entries.get(self.cursor)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
    }

    /// Go to the parent directory, placing the cursor on the directory we came from.
    pub fn go_parent(&mut self) -> io::Result<()> {
        let Some(parent) = self.dir.parent().map(Path::to_path_buf) else {
            return Ok(());
        };
        let came_from = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        self.change_dir(parent)?;
        if let Some(name) = came_from
            && let Some(pos) = self.entries.iter().position(|e| e.name == name)
        {
            self.cursor = pos;
        }
        Ok(())
    }

    /// Activate the entry under the cursor.
    ///
    /// Directories are entered and yield `None`; files yield a [`Selection`].
    pub fn open(&mut self) -> io::Result<Option<Selection>> {
        let Some(entry) = self.selected().cloned() else {
            return Ok(None);
        };
        if entry.is_dir {
            self.change_dir(entry.path)?;
            return Ok(None);
        }
        Ok(Some(if entry.allowed {
            Selection::Selected(entry.path)
        } else {
            Selection::Rejected(entry.path)
        }))
    }

    fn change_dir(&mut self, dir: PathBuf) -> io::Result<()> {
        let previous = std::mem::replace(&mut self.dir, dir);
        match self.read_entries() {
            Ok(entries) => {
                self.entries = entries;
                self.cursor = 0;
                Ok(())
            }
            Err(e) => {
                self.dir = previous;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn browser_in(dir: &Path) -> FileBrowser {
        let config = Config {
            start_dir: dir.to_path_buf(),
            ..Config::default()
        };
        FileBrowser::new(&config).unwrap()
    }

    #[test]
    fn lists_directories_first_and_hides_dot_files() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("b.txt"), "b").unwrap();
        fs::write(td.path().join("a.png"), "a").unwrap();
        fs::write(td.path().join(".secret"), "s").unwrap();
        fs::create_dir(td.path().join("zdir")).unwrap();

        let browser = browser_in(td.path());
        let names: Vec<_> = browser.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["zdir", "a.png", "b.txt"]);
    }

    #[test]
    fn open_reports_allowed_and_rejected_files() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("a.png"), "a").unwrap();
        fs::write(td.path().join("b.txt"), "b").unwrap();
        let mut browser = browser_in(td.path());

        match browser.open().unwrap() {
            Some(Selection::Rejected(p)) => assert!(p.ends_with("a.png")),
            other => panic!("unexpected {other:?}"),
        }
        browser.move_down();
        match browser.open().unwrap() {
            Some(Selection::Selected(p)) => assert!(p.ends_with("b.txt")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn enters_directories_and_returns_to_parent() {
        let td = tempdir().unwrap();
        fs::create_dir(td.path().join("inner")).unwrap();
        fs::write(td.path().join("inner").join("notes.md"), "x").unwrap();
        fs::write(td.path().join("z.txt"), "z").unwrap();
        let mut browser = browser_in(td.path());

        assert_eq!(browser.open().unwrap(), None);
        assert!(browser.dir().ends_with("inner"));
        assert_eq!(browser.selected().unwrap().name, "notes.md");

        browser.go_parent().unwrap();
        assert_eq!(browser.selected().unwrap().name, "inner");
    }

    #[test]
    fn marks_encrypted_files() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("locked.txt"), "ENCRYPTED\nAAAA\n").unwrap();
        fs::write(td.path().join("plain.txt"), "hello").unwrap();
        let browser = browser_in(td.path());

        let flags: Vec<_> = browser
            .entries()
            .iter()
            .map(|e| (e.name.as_str(), e.encrypted))
            .collect();
        assert_eq!(flags, [("locked.txt", true), ("plain.txt", false)]);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("only.txt"), "x").unwrap();
        let mut browser = browser_in(td.path());
        browser.move_up();
        browser.move_down();
        browser.move_down();
        assert_eq!(browser.cursor(), 0);
    }
}
