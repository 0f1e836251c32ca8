//! Shared application state for handlers

use kiddyblaster_hardware::ReaderDevice;
use kiddyblaster_hardware::mock::MockReaderHandle;
use kiddyblaster_scan::Scanner;
use kiddyblaster_storage::{Reconciler, SqliteRegistry};
use std::sync::Arc;

/// The reader the server drives, whatever its concrete device.
pub type Device = Box<dyn ReaderDevice>;

/// State handed to every handler.
///
/// Cloning is cheap; all clones drive the same reader and registry.
#[derive(Clone)]
pub struct AppState {
    pub scanner: Scanner<Device>,
    pub registry: SqliteRegistry,
    pub reconciler: Arc<Reconciler<SqliteRegistry, Device>>,

    /// Control handle when the server runs the simulated reader.
    pub simulator: Option<MockReaderHandle>,
}

impl AppState {
    pub fn new(scanner: Scanner<Device>, registry: SqliteRegistry) -> Self {
        let reconciler = Reconciler::new(registry.clone(), scanner.clone());
        Self {
            scanner,
            registry,
            reconciler: Arc::new(reconciler),
            simulator: None,
        }
    }

    /// Expose simulator control endpoints backed by `handle`.
    pub fn with_simulator(mut self, handle: MockReaderHandle) -> Self {
        self.simulator = Some(handle);
        self
    }
}
