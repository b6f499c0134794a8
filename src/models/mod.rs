mod product;

pub use product::{NewProduct, Product, UpdateProduct};
