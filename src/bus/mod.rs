// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Name-addressed envelope delivery between workers.

mod dispatch;
mod registry;

pub use dispatch::{BusHandle, DispatchBus};
pub use registry::HandlerRegistry;
