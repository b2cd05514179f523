pub mod chat_form;
pub mod chat_page_route;
pub mod chat_view;
