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
pub mod content_element;
pub mod headline;
pub mod layout;
pub mod member;
pub mod member_group;
pub mod module_config;
pub mod opt_in;
pub mod page;
pub mod page_details;
pub mod search_entry;
pub mod session;

pub use article::*;
pub use content_element::*;
pub use headline::*;
pub use layout::*;
pub use member::*;
pub use member_group::*;
pub use module_config::*;
pub use opt_in::*;
pub use page::*;
pub use page_details::*;
pub use search_entry::*;
pub use session::*;
