//! # Menudesk Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs          # Router over in-memory backends
//!     ├── gateway_flows.rs    # Auth, menus, todos, users, uploads over HTTP
//!     └── hosted_flows.rs     # Gateway against a mocked hosted backend
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p md-tests
//! cargo bench -p md-tests
//! ```

pub mod integration;
