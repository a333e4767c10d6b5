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

pub mod article_repository;
pub mod content_repository;
pub mod layout_repository;
pub mod member_group_repository;
pub mod member_repository;
pub mod member_session_repository;
pub mod module_repository;
pub mod opt_in_repository;
pub mod page_repository;
pub mod search_repository;

pub use article_repository::ArticleRepository;
pub use content_repository::ContentRepository;
pub use layout_repository::LayoutRepository;
pub use member_group_repository::MemberGroupRepository;
pub use member_repository::MemberRepository;
pub use member_session_repository::MemberSessionRepository;
pub use module_repository::ModuleRepository;
pub use opt_in_repository::OptInRepository;
pub use page_repository::PageRepository;
pub use search_repository::SearchRepository;
