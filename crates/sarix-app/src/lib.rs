// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod ads;
pub mod input;
pub mod model;
pub mod state;

pub use ads::*;
pub use input::*;
pub use model::*;
pub use state::*;
