// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Type-erased aliases for the sampling client handlers hold onto.
//! Keeping the engine crate non-generic over a transport means a
//! binary can wire in whatever `Sampler` it likes without the handler
//! types changing.

use ctz_sampling::{Sampler, SamplingClient};
use std::sync::Arc;

pub type DynSampler = Arc<dyn Sampler>;
pub type AiClient = SamplingClient<DynSampler>;
