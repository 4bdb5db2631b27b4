use extractor::ImageExtractor;

#[derive(Clone)]
pub struct AppState {
    pub extractor: ImageExtractor,
}

impl AppState {
    pub fn new(extractor: ImageExtractor) -> Self {
        Self { extractor }
    }
}
