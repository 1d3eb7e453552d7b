use trellis_core::{BoxError, HostCallbacks};

/// Host that prints each resource load instead of performing it.
///
/// Used by the `boot` and `config` commands to show what a real host would
/// be asked to load.
#[derive(Debug, Default)]
pub struct PrintingHost {
    loads: usize,
}

impl PrintingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks received so far
    pub fn loads(&self) -> usize {
        self.loads
    }

    fn print(&mut self, kind: &str, namespace: Option<&str>, paths: &[String]) {
        self.loads += 1;
        match namespace {
            Some(ns) => println!("  {} [{}]: {}", kind, ns, paths.join(", ")),
            None => println!("  {}: {}", kind, paths.join(", ")),
        }
    }
}

impl HostCallbacks for PrintingHost {
    fn load_routes(&mut self, paths: &[String]) -> Result<(), BoxError> {
        self.print("routes", None, paths);
        Ok(())
    }

    fn load_views(&mut self, paths: &[String], namespace: &str) -> Result<(), BoxError> {
        self.print("views", Some(namespace), paths);
        Ok(())
    }

    fn load_migrations(&mut self, paths: &[String]) -> Result<(), BoxError> {
        self.print("migrations", None, paths);
        Ok(())
    }

    fn load_translations(&mut self, paths: &[String], namespace: &str) -> Result<(), BoxError> {
        self.print("translations", Some(namespace), paths);
        Ok(())
    }
}
