// src/iterator/reorder.rs
use crate::error::{Result, StoreError};

/// Record stream with the record at `from` relocated to output position `to`
pub(crate) struct MoveStream<I, T> {
    inner: I,
    from: usize,
    to: usize,
    moved: Option<T>,
    read: usize,
    emitted: usize,
}

impl<I, T> MoveStream<I, T> {
    pub(crate) fn new(inner: I, from: usize, to: usize, moved: T) -> Self {
        Self {
            inner,
            from,
            to,
            moved: Some(moved),
            read: 0,
            emitted: 0,
        }
    }
}

impl<I, T> Iterator for MoveStream<I, T>
where
    I: Iterator<Item = Result<T>>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted == self.to {
            if let Some(moved) = self.moved.take() {
                self.emitted += 1;
                return Some(Ok(moved));
            }
        }
        loop {
            let Some(item) = self.inner.next() else {
                // the slot for the moved record was never reached
                return self.moved.take().map(|_| {
                    Err(StoreError::Format(format!(
                        "store shorter than expected while moving to index {}",
                        self.to
                    )))
                });
            };
            let position = self.read;
            self.read += 1;
            if position == self.from {
                match item {
                    Ok(_) => continue,
                    Err(err) => return Some(Err(err)),
                }
            }
            self.emitted += 1;
            return Some(item);
        }
    }
}
