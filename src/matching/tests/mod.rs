mod common;
mod governance;
