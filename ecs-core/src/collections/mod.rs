// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Leaf containers the ECS is built on
//!
//! - [`DynamicBitset`]: growable bit vector with word-level scans
//! - [`FreeableVector`]: vector with a bitset freelist for O(1) erase and slot reuse

mod bitset;
mod freeable;

pub use bitset::{DynamicBitset, Ones};
pub use freeable::FreeableVector;
