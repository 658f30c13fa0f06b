// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod forms;
pub mod ids;
pub mod model;
pub mod pagination;
pub mod seed;
pub mod state;
pub mod storage;

pub use forms::*;
pub use ids::*;
pub use model::*;
pub use pagination::*;
pub use seed::*;
pub use state::*;
pub use storage::*;
