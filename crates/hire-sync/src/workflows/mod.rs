pub mod hired;
