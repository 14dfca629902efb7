/// Text of the task that is currently being typed.
#[derive(Debug, Default, Clone)]
pub struct EditBuffer {
    text: String,
}

impl EditBuffer {
    /// Only printable characters and whitespace are accepted. Returns whether `ch` was added.
    pub fn append(&mut self, ch: char) -> bool {
        if !is_accepted(ch) {
            return false;
        }
        self.text.push(ch);
        true
    }

    pub fn delete_last(&mut self) -> Option<char> {
        self.text.pop()
    }

    /// A copy of the current text. The buffer itself never leaves the input loop.
    pub fn snapshot(&self) -> String {
        self.text.clone()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

pub fn is_accepted(ch: char) -> bool {
    ch.is_whitespace() || !ch.is_control()
}
