/// Output collaborator receiving decoded bytes one at a time
pub trait ByteSink {
    fn add_data(&mut self, byte: u8);
}

impl ByteSink for Vec<u8> {
    fn add_data(&mut self, byte: u8) {
        self.push(byte);
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn add_data(&mut self, byte: u8) {
        (**self).add_data(byte);
    }
}

/// Adapts a closure into a [`ByteSink`]
///
/// ```
/// use qamwave_core::{ByteSink, FnSink};
///
/// let mut count = 0;
/// let mut sink = FnSink(|_byte: u8| count += 1);
/// sink.add_data(0x42);
/// drop(sink);
/// assert_eq!(count, 1);
/// ```
pub struct FnSink<F>(pub F);

impl<F: FnMut(u8)> ByteSink for FnSink<F> {
    fn add_data(&mut self, byte: u8) {
        (self.0)(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed<S: ByteSink>(mut sink: S, bytes: &[u8]) {
        for &byte in bytes {
            sink.add_data(byte);
        }
    }

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut out: Vec<u8> = Vec::new();
        feed(&mut out, b"abc");
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_fn_sink_forwards() {
        let mut seen = Vec::new();
        feed(FnSink(|b: u8| seen.push(b ^ 0xFF)), &[0x00, 0x0F]);
        assert_eq!(seen, vec![0xFF, 0xF0]);
    }
}
