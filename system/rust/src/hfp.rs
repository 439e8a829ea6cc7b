// Copyright 2024, The Android Open Source Project
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

//! Hands-Free call-state and audio-routing coordinator
//!
//! Up to two phones (Audio Gateways) may be connected at once. The coordinator
//! tracks call state per connection slot and arbitrates the single shared audio
//! codec between them:
//!
//! ```text
//!     profile transport                      coordinator
//!    ___________________   indications    ______________       ______________
//!   |                   | -------------> |  slot table  | --> | audio codec  |
//!   |  HF server ports  |                |  [0]   [1]   |     |  driver      |
//!   |                   | <------------- |  wbs owner   | --> | vendor WBS   |
//!   |___________________|   commands     |______________|     |______________|
//! ```

pub mod call_hold;
pub mod codec;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod features;
pub mod indication;
pub mod mocks;
pub mod slot;
pub mod transport;

pub use call_hold::CallHoldHandling;
pub use codec::{CodecId, SampleRate};
pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use error::{CoordinatorError, CoordinatorResult};
pub use features::AgFeatures;
pub use indication::{CallIndicator, Indication};
pub use transport::{AudioCodec, HfpTransport, TransportError, VendorCodec};
