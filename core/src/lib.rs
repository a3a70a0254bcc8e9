// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Session transport for the HUAWEI iBMC Redfish API.
//!
//! This crate provides the low-level plumbing shared by the typed client:
//!
//! - [`odata`]: minimal `@odata.id` / `@odata.etag` wrappers.
//! - [`connector`]: the session-authenticated HTTP transport. It logs in
//!   against `SessionService/Sessions`, keeps the `X-Auth-Token` fresh
//!   (one transparent re-login per request on 401), and enforces the
//!   ETag/`If-Match` read-modify-write discipline the iBMC requires for
//!   PATCH and PUT.
//! - [`error`]: transport failure classification, including the Redfish
//!   `@Message.ExtendedInfo` error body format.

pub mod connector;
pub mod error;
pub mod odata;

#[doc(inline)]
pub use connector::ClientParams;
#[doc(inline)]
pub use connector::Connector;
#[doc(inline)]
pub use connector::Method;
#[doc(inline)]
pub use connector::Response;
#[doc(inline)]
pub use connector::StatusCode;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use error::HttpError;
#[doc(inline)]
pub use error::HttpErrorKind;
#[doc(inline)]
pub use odata::ODataETag;
#[doc(inline)]
pub use odata::ODataId;
#[doc(inline)]
pub use odata::ODataRef;
