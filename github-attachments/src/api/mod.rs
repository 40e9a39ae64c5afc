mod assets;

pub use assets::AssetsApi;
