/// One train/test partition of a sampling round.
#[derive(Debug, Clone)]
pub struct Fold<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
    pub fold_num: usize,
}

impl<T> Fold<T> {
    pub fn new(fold_num: usize) -> Self {
        Self {
            train: Vec::new(),
            test: Vec::new(),
            fold_num,
        }
    }
}
