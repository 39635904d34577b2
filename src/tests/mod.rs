//! Scenario tests across the overlay managers.
//!
//! These drive marker and sector managers together on one shared
//! [`MemoryViewer`](siteplan_viewer::MemoryViewer), the way a host does.
