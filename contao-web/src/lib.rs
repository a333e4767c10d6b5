// Contao - front-end rendering core for the Contao CMS
// Copyright (C) 2025 Contao Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

pub mod article;
pub mod auth;
pub mod configuration;
pub mod csrf;
pub mod elements;
pub mod error;
pub mod indexer;
pub mod mailer;
pub mod markdown;
pub mod modules;
pub mod page;
pub mod render;
pub mod request;
pub mod request_logging;
pub mod routes;
pub mod state;
pub mod templates;

#[cfg(test)]
pub mod test_helpers;

pub use configuration::Config;
pub use state::AppState;
