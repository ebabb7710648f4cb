//! Recursive query walker with bit-parallel fast-forwarding.
//!
//! Two mutually recursive procedures, [`Walker::object`] and
//! [`Walker::array`], drive the automaton over a record. Neither ever reads
//! the bytes of a value it skips: every skip reduces to interval queries
//! against the structural index, counting opener/closer balance or commas
//! inside bit intervals. Byte-at-a-time movement only happens off the hot
//! path, for short spans such as recovering an attribute key around a `:`.
//!
//! Fast-forward primitives communicate through [`Jump`] outcomes rather
//! than errors; running off the end of the record surfaces as the closing
//! outcome of the enclosing container, so malformed input unwinds cleanly.

use crate::dfa::{Automaton, Cursor, StateId, ValueClass, UNMATCHED};
use crate::index::{Class, StructuralIndex};
use crate::interval;

/// Control-flow outcome of a fast-forward primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Jump {
    /// Landed on the sought position.
    Success,
    /// Hit the `]` closing the current array.
    ArrayEnd,
    /// Hit the `}` closing the current object.
    ObjectEnd,
    /// Consumed the remaining element range.
    RangeEnd,
    /// Skipped `commas` primitive siblings, then hit a container element.
    Partial { commas: i64 },
}

#[inline]
fn is_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// One evaluation of a compiled query over one record.
pub(crate) struct Walker<'a, 'q> {
    record: &'a [u8],
    num_words: usize,
    index: StructuralIndex<'a>,
    automaton: &'q Automaton,
    cursor: &'q mut Cursor,
    pos: usize,
    matches: u64,
}

impl<'a, 'q> Walker<'a, 'q> {
    pub(crate) fn new(
        record: &'a [u8],
        automaton: &'q Automaton,
        cursor: &'q mut Cursor,
    ) -> Self {
        Walker {
            record,
            num_words: record.len() / 64,
            index: StructuralIndex::new(record),
            automaton,
            cursor,
            pos: 0,
            matches: 0,
        }
    }

    /// Dispatch on the record's first non-whitespace byte and walk it.
    pub(crate) fn run(mut self) -> u64 {
        self.skip_ws();
        match self.byte() {
            Some(b'{') => {
                if self.automaton.expected_in_object(self.cursor.state()) != ValueClass::None {
                    self.object();
                }
            }
            Some(b'[') => {
                if self.automaton.expected_in_array(self.cursor.state()) != ValueClass::None {
                    self.array();
                }
            }
            _ => {}
        }
        self.matches
    }

    #[inline]
    fn byte(&self) -> Option<u8> {
        self.record.get(self.pos).copied()
    }

    #[inline]
    fn skip_ws(&mut self) {
        while let Some(b) = self.byte() {
            if !is_ws(b) {
                break;
            }
            self.pos += 1;
        }
    }

    /// Step off the current token and report whether another attribute
    /// follows before the closing `}`.
    fn has_more_attributes(&mut self) -> bool {
        self.skip_ws();
        self.pos += 1;
        self.skip_ws();
        match self.byte() {
            None | Some(b'}') => false,
            Some(b',') => {
                self.pos += 1;
                self.skip_ws();
                self.byte().is_some()
            }
            Some(_) => true,
        }
    }

    /// Step off the current token and report whether another element
    /// follows before the closing `]`.
    fn has_more_elements(&mut self) -> bool {
        self.skip_ws();
        self.pos += 1;
        self.skip_ws();
        match self.byte() {
            None | Some(b']') => false,
            Some(b',') => {
                self.pos += 1;
                self.skip_ws();
                self.byte().is_some()
            }
            Some(_) => true,
        }
    }

    /// Class of the value starting at (or after whitespace from) `pos`.
    #[inline]
    fn value_class_at(&mut self) -> ValueClass {
        self.skip_ws();
        match self.byte() {
            Some(b'{') => ValueClass::Object,
            Some(b'[') => ValueClass::Array,
            _ => ValueClass::Primitive,
        }
    }

    // ------------------------------------------------------------------
    // Fast-forward primitives
    // ------------------------------------------------------------------

    /// Advance to the closer that balances one open `open_class` container.
    ///
    /// Walks opener-bit intervals; each interval bounds a popcount of
    /// closers. When the closer count reaches the open count the matching
    /// closer is the n-th closer bit of the interval.
    fn skip_balanced(&mut self, open_class: Class, close_class: Class, on_end: Jump) -> Jump {
        let mut num_open: i64 = 1;
        let mut word_id = self.pos / 64;
        let mut openers = 0u64;
        let mut loaded = false;
        let mut walking = false;
        let mut new_word = false;
        while word_id < self.num_words {
            self.index.seek(word_id);
            if !loaded {
                openers = self.index.bits(open_class);
                loaded = true;
            }
            let iv = if walking {
                interval::next(&mut openers)
            } else if new_word {
                interval::from_word_start(&mut openers)
            } else {
                interval::from_pos(self.pos, &mut openers)
            };
            let closers_in = self.index.bits(close_class) & iv.bits;
            let closed = closers_in.count_ones() as i64;
            if closed >= num_open {
                self.pos = word_id * 64 + interval::nth_set(closers_in, num_open as u32) as usize;
                return Jump::Success;
            }
            num_open -= closed;
            if iv.complete {
                num_open += 1;
                walking = true;
            } else {
                word_id += 1;
                loaded = false;
                walking = false;
                new_word = true;
            }
        }
        self.pos = self.record.len();
        on_end
    }

    /// Skip a whole object; enter with `pos` at (or before) its `{`.
    #[inline]
    fn skip_object(&mut self) {
        self.skip_balanced(Class::LBrace, Class::RBrace, Jump::ObjectEnd);
    }

    /// Skip a whole array; enter with `pos` at (or before) its `[`.
    #[inline]
    fn skip_array(&mut self) {
        self.skip_balanced(Class::LBracket, Class::RBracket, Jump::ArrayEnd);
    }

    /// Advance past a primitive attribute value, landing one byte before
    /// the following comma or closing brace.
    fn skip_primitive_attr(&mut self) {
        let mut word_id = self.pos / 64;
        let mut new_word = false;
        while word_id < self.num_words {
            self.index.seek(word_id);
            let mut commas = self.index.bits(Class::Comma);
            let iv = if new_word {
                interval::from_word_start(&mut commas)
            } else {
                interval::from_pos(self.pos, &mut commas)
            };
            let rbrace = self.index.bits(Class::RBrace) & iv.bits;
            if rbrace != 0 {
                self.pos = word_id * 64 + interval::nth_set(rbrace, 1) as usize - 1;
                return;
            }
            if iv.complete {
                self.pos = word_id * 64 + interval::end_bit(iv.bits) as usize - 1;
                return;
            }
            word_id += 1;
            new_word = true;
        }
        self.pos = self.record.len();
    }

    /// Advance past a primitive element value.
    ///
    /// Lands one byte before the next comma, or on the closing `]`.
    fn skip_primitive_elem(&mut self) -> Jump {
        let mut word_id = self.pos / 64;
        let mut new_word = false;
        while word_id < self.num_words {
            self.index.seek(word_id);
            let mut commas = self.index.bits(Class::Comma);
            let iv = if new_word {
                interval::from_word_start(&mut commas)
            } else {
                interval::from_pos(self.pos, &mut commas)
            };
            let rbracket = self.index.bits(Class::RBracket) & iv.bits;
            if rbracket != 0 {
                self.pos = word_id * 64 + interval::nth_set(rbracket, 1) as usize;
                return Jump::ArrayEnd;
            }
            if iv.complete {
                self.pos = word_id * 64 + interval::end_bit(iv.bits) as usize - 1;
                return Jump::Success;
            }
            word_id += 1;
            new_word = true;
        }
        self.pos = self.record.len();
        Jump::ArrayEnd
    }

    /// Advance over consecutive primitive attributes to the next container
    /// opener, or to the closing `}`.
    fn skip_primitive_attrs(&mut self) -> Jump {
        let mut word_id = self.pos / 64;
        let mut new_word = false;
        while word_id < self.num_words {
            self.index.seek(word_id);
            let mut openers = self.index.bits(Class::LBrace) | self.index.bits(Class::LBracket);
            let iv = if new_word {
                interval::from_word_start(&mut openers)
            } else {
                interval::from_pos(self.pos, &mut openers)
            };
            let rbrace = self.index.bits(Class::RBrace) & iv.bits;
            if rbrace != 0 {
                self.pos = word_id * 64 + interval::nth_set(rbrace, 1) as usize;
                return Jump::ObjectEnd;
            }
            if iv.complete {
                self.pos = word_id * 64 + interval::end_bit(iv.bits) as usize;
                return Jump::Success;
            }
            word_id += 1;
            new_word = true;
        }
        self.pos = self.record.len();
        Jump::ObjectEnd
    }

    /// Advance over consecutive primitive elements to the next container
    /// opener, or to the closing `]`.
    fn skip_primitive_elems(&mut self) -> Jump {
        let mut word_id = self.pos / 64;
        let mut new_word = false;
        while word_id < self.num_words {
            self.index.seek(word_id);
            let mut openers = self.index.bits(Class::LBrace) | self.index.bits(Class::LBracket);
            let iv = if new_word {
                interval::from_word_start(&mut openers)
            } else {
                interval::from_pos(self.pos, &mut openers)
            };
            let rbracket = self.index.bits(Class::RBracket) & iv.bits;
            if rbracket != 0 {
                self.pos = word_id * 64 + interval::nth_set(rbracket, 1) as usize;
                return Jump::ArrayEnd;
            }
            if iv.complete {
                self.pos = word_id * 64 + interval::end_bit(iv.bits) as usize;
                return Jump::Success;
            }
            word_id += 1;
            new_word = true;
        }
        self.pos = self.record.len();
        Jump::ArrayEnd
    }

    /// Seek the next attribute whose value is an object, skipping arrays.
    fn seek_object_attr(&mut self) -> Jump {
        loop {
            if self.skip_primitive_attrs() == Jump::ObjectEnd {
                return Jump::ObjectEnd;
            }
            match self.value_class_at() {
                ValueClass::Object => return Jump::Success,
                ValueClass::Array => self.skip_array(),
                _ => return Jump::ObjectEnd,
            }
            if !self.has_more_attributes() {
                return Jump::ObjectEnd;
            }
        }
    }

    /// Seek the next attribute whose value is an array, skipping objects.
    fn seek_array_attr(&mut self) -> Jump {
        loop {
            if self.skip_primitive_attrs() == Jump::ObjectEnd {
                return Jump::ObjectEnd;
            }
            match self.value_class_at() {
                ValueClass::Array => return Jump::Success,
                ValueClass::Object => self.skip_object(),
                _ => return Jump::ObjectEnd,
            }
            if !self.has_more_attributes() {
                return Jump::ObjectEnd;
            }
        }
    }

    /// Seek the next element that is an object, skipping everything else.
    fn seek_object_elem(&mut self) -> Jump {
        loop {
            if !matches!(self.byte(), Some(b'{') | Some(b'[')) {
                if self.skip_primitive_elems() == Jump::ArrayEnd {
                    return Jump::ArrayEnd;
                }
            }
            match self.value_class_at() {
                ValueClass::Object => return Jump::Success,
                ValueClass::Array => self.skip_array(),
                _ => return Jump::ArrayEnd,
            }
            if !self.has_more_elements() {
                return Jump::ArrayEnd;
            }
        }
    }

    /// Seek the next element that is an array, skipping everything else.
    fn seek_array_elem(&mut self) -> Jump {
        loop {
            if !matches!(self.byte(), Some(b'{') | Some(b'[')) {
                if self.skip_primitive_elems() == Jump::ArrayEnd {
                    return Jump::ArrayEnd;
                }
            }
            match self.value_class_at() {
                ValueClass::Array => return Jump::Success,
                ValueClass::Object => self.skip_object(),
                _ => return Jump::ArrayEnd,
            }
            if !self.has_more_elements() {
                return Jump::ArrayEnd;
            }
        }
    }

    /// Skip up to `n` primitive siblings in one pass.
    ///
    /// Counts commas inside the interval bounded by the next container
    /// opener. Landing on the n-th comma is `Success`; a closing bracket
    /// first ends the array; an opener first reports how many siblings
    /// were consumed so the caller can continue with the container.
    fn skip_primitive_elems_in_range(&mut self, n: i64) -> Jump {
        let mut word_id = self.pos / 64;
        let mut skipped: i64 = 0;
        let mut new_word = false;
        while word_id < self.num_words {
            self.index.seek(word_id);
            let mut openers = self.index.bits(Class::LBrace) | self.index.bits(Class::LBracket);
            let iv = if new_word {
                interval::from_word_start(&mut openers)
            } else {
                interval::from_pos(self.pos, &mut openers)
            };
            let rbracket = self.index.bits(Class::RBracket) & iv.bits;
            let mut commas = self.index.bits(Class::Comma) & iv.bits;
            if rbracket != 0 {
                // Only commas before the closing bracket separate siblings.
                commas &= rbracket ^ rbracket.wrapping_sub(1);
            }
            let here = commas.count_ones() as i64;
            if skipped + here >= n {
                let within = (n - skipped) as u32;
                self.pos = word_id * 64 + interval::nth_set(commas, within) as usize;
                return Jump::Success;
            }
            if rbracket != 0 {
                self.pos = word_id * 64 + interval::nth_set(rbracket, 1) as usize;
                return Jump::ArrayEnd;
            }
            if iv.complete {
                self.pos = word_id * 64 + interval::end_bit(iv.bits) as usize;
                return Jump::Partial {
                    commas: skipped + here,
                };
            }
            skipped += here;
            word_id += 1;
            new_word = true;
        }
        self.pos = self.record.len();
        Jump::ArrayEnd
    }

    /// Skip exactly `n` elements of any class.
    fn skip_elems(&mut self, mut n: i64) -> Jump {
        if n <= 0 {
            return Jump::Success;
        }
        if !self.has_more_elements() {
            return Jump::ArrayEnd;
        }
        loop {
            match self.value_class_at() {
                ValueClass::Object => self.skip_object(),
                ValueClass::Array => self.skip_array(),
                _ => match self.skip_primitive_elems_in_range(n) {
                    Jump::Success => return Jump::Success,
                    Jump::ArrayEnd => return Jump::ArrayEnd,
                    Jump::Partial { commas } => {
                        // The bulk skip stopped on a container opener; that
                        // container is the next unconsumed element.
                        n -= commas;
                        continue;
                    }
                    _ => {}
                },
            }
            n -= 1;
            if n == 0 {
                return Jump::Success;
            }
            if !self.has_more_elements() {
                return Jump::ArrayEnd;
            }
        }
    }

    /// Seek the next object element within the remaining range.
    fn seek_object_elem_in_range(&mut self, remaining: &mut i64) -> Jump {
        loop {
            match self.value_class_at() {
                ValueClass::Object => return Jump::Success,
                ValueClass::Array => self.skip_array(),
                _ => match self.skip_primitive_elems_in_range(*remaining) {
                    Jump::ArrayEnd => return Jump::ArrayEnd,
                    Jump::Success => return Jump::RangeEnd,
                    Jump::Partial { commas } => {
                        *remaining -= commas;
                        if *remaining <= 0 {
                            return Jump::RangeEnd;
                        }
                        continue;
                    }
                    _ => {}
                },
            }
            *remaining -= 1;
            if !self.has_more_elements() {
                return Jump::ArrayEnd;
            }
            if *remaining <= 0 {
                return Jump::RangeEnd;
            }
        }
    }

    /// Seek the next array element within the remaining range.
    fn seek_array_elem_in_range(&mut self, remaining: &mut i64) -> Jump {
        loop {
            match self.value_class_at() {
                ValueClass::Array => return Jump::Success,
                ValueClass::Object => self.skip_object(),
                _ => match self.skip_primitive_elems_in_range(*remaining) {
                    Jump::ArrayEnd => return Jump::ArrayEnd,
                    Jump::Success => return Jump::RangeEnd,
                    Jump::Partial { commas } => {
                        *remaining -= commas;
                        if *remaining <= 0 {
                            return Jump::RangeEnd;
                        }
                        continue;
                    }
                    _ => {}
                },
            }
            *remaining -= 1;
            if !self.has_more_elements() {
                return Jump::ArrayEnd;
            }
            if *remaining <= 0 {
                return Jump::RangeEnd;
            }
        }
    }

    // ------------------------------------------------------------------
    // Key recovery
    // ------------------------------------------------------------------

    /// Read the key ahead of `pos`, leave `pos` just past the `:`, and
    /// return the transition it selects.
    fn key_forward(&mut self) -> Option<StateId> {
        let len = self.record.len();
        let mut st = self.pos;
        while st < len && self.record[st] != b'"' {
            st += 1;
        }
        let mut ed = st + 1;
        while ed < len && self.record[ed] != b'"' {
            ed += 1;
        }
        if ed >= len {
            self.pos = len;
            return None;
        }
        let next = self
            .automaton
            .next_state_for_key(self.cursor.state(), &self.record[st + 1..ed]);
        let mut colon = ed;
        while colon < len && self.record[colon] != b':' {
            colon += 1;
        }
        self.pos = colon + 1;
        Some(next)
    }

    /// Recover the key behind `pos` (scanning back from the `:`) and return
    /// the transition it selects. `pos` sits on the attribute's value.
    fn key_backward(&self) -> StateId {
        let rec = self.record;
        let mut st = self.pos.min(rec.len().saturating_sub(1));
        while st > 0 && rec[st] != b':' {
            st -= 1;
        }
        while st > 0 && rec[st] != b'"' {
            st -= 1;
        }
        let mut ed = st.saturating_sub(1);
        while ed > 0 && rec[ed] != b'"' {
            ed -= 1;
        }
        if st == 0 {
            return UNMATCHED;
        }
        self.automaton
            .next_state_for_key(self.cursor.state(), &rec[ed + 1..st])
    }

    // ------------------------------------------------------------------
    // Walkers
    // ------------------------------------------------------------------

    /// Walk an object; enter with `pos` on the `{` (or the token before the
    /// first attribute).
    fn object(&mut self) {
        let expected = self.automaton.expected_in_object(self.cursor.state());
        while self.has_more_attributes() {
            let mut next_state = UNMATCHED;
            let mut vclass = expected;
            match expected {
                ValueClass::Object => {
                    if self.seek_object_attr() == Jump::ObjectEnd {
                        return;
                    }
                    next_state = self.key_backward();
                }
                ValueClass::Array => {
                    if self.seek_array_attr() == Jump::ObjectEnd {
                        return;
                    }
                    next_state = self.key_backward();
                }
                ValueClass::Primitive | ValueClass::None => {
                    next_state = match self.key_forward() {
                        Some(next) => next,
                        None => return,
                    };
                    vclass = self.value_class_at();
                }
            }
            if next_state == UNMATCHED {
                match vclass {
                    ValueClass::Object => self.skip_object(),
                    ValueClass::Array => self.skip_array(),
                    _ => self.skip_primitive_attr(),
                }
            } else if self.automaton.is_accepting(next_state) {
                self.matches += 1;
                match vclass {
                    ValueClass::Object => self.skip_object(),
                    ValueClass::Array => self.skip_array(),
                    _ => {
                        self.skip_primitive_attr();
                        self.pos += 1;
                    }
                }
                if self.byte() != Some(b'}') {
                    if self.cursor.depth() == 0 {
                        return;
                    }
                    self.skip_object();
                }
                break;
            } else {
                self.cursor.push(next_state);
                match expected {
                    ValueClass::Object => self.object(),
                    ValueClass::Array => self.array(),
                    _ => {}
                }
                self.cursor.pop();
                if self.cursor.depth() == 0 {
                    return;
                }
                self.skip_object();
                break;
            }
        }
    }

    /// Walk an array; enter with `pos` on the `[`.
    fn array(&mut self) {
        let next = self.automaton.next_state_no_key(self.cursor.state());
        self.cursor.push(next);
        let expected = self.automaton.expected_in_array(self.cursor.state());

        if let Some(range) = self.automaton.index_range(self.cursor.state()) {
            let mut remaining = range.end.saturating_sub(range.start);
            if range.start > 0 && self.skip_elems(range.start) == Jump::ArrayEnd {
                self.cursor.pop();
                return;
            }
            while self.has_more_elements() && remaining > 0 {
                if self.automaton.is_accepting(self.cursor.state()) {
                    self.matches += 1;
                    let vclass = if expected == ValueClass::Primitive {
                        self.value_class_at()
                    } else {
                        expected
                    };
                    let mut at_end = false;
                    match vclass {
                        ValueClass::Object => self.skip_object(),
                        ValueClass::Array => self.skip_array(),
                        _ => at_end = self.skip_primitive_elem() == Jump::ArrayEnd,
                    }
                    if at_end {
                        if self.byte() != Some(b']') {
                            self.skip_array();
                        }
                        break;
                    }
                    remaining -= 1;
                } else if self.cursor.state() != UNMATCHED {
                    let result = match expected {
                        ValueClass::Object => self.seek_object_elem_in_range(&mut remaining),
                        ValueClass::Array => self.seek_array_elem_in_range(&mut remaining),
                        _ => Jump::RangeEnd,
                    };
                    match result {
                        Jump::Success => {
                            match expected {
                                ValueClass::Object => self.object(),
                                ValueClass::Array => self.array(),
                                _ => {}
                            }
                            remaining -= 1;
                        }
                        Jump::ArrayEnd => {
                            self.cursor.pop();
                            return;
                        }
                        _ => {
                            if self.byte() != Some(b']') {
                                if self.cursor.depth() == 1 {
                                    return;
                                }
                                self.skip_array();
                            }
                            break;
                        }
                    }
                } else {
                    self.skip_array();
                    break;
                }
            }
            if self.byte() != Some(b']') {
                if self.cursor.depth() == 1 {
                    return;
                }
                self.skip_array();
            }
        } else {
            while self.has_more_elements() {
                if self.automaton.is_accepting(self.cursor.state()) {
                    self.matches += 1;
                    let vclass = if expected == ValueClass::Primitive {
                        self.value_class_at()
                    } else {
                        expected
                    };
                    let mut at_end = false;
                    match vclass {
                        ValueClass::Object => self.skip_object(),
                        ValueClass::Array => self.skip_array(),
                        _ => at_end = self.skip_primitive_elem() == Jump::ArrayEnd,
                    }
                    if at_end {
                        break;
                    }
                } else if self.cursor.state() != UNMATCHED {
                    if self.value_class_at() != expected {
                        let result = match expected {
                            ValueClass::Object => self.seek_object_elem(),
                            ValueClass::Array => self.seek_array_elem(),
                            _ => Jump::ArrayEnd,
                        };
                        if result == Jump::ArrayEnd {
                            self.cursor.pop();
                            return;
                        }
                    }
                    match expected {
                        ValueClass::Object => self.object(),
                        ValueClass::Array => self.array(),
                        _ => {
                            self.cursor.pop();
                            return;
                        }
                    }
                } else {
                    self.skip_array();
                    break;
                }
            }
        }
        self.cursor.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::Cursor;
    use crate::path::compile;

    fn run_query(query: &str, json: &[u8]) -> u64 {
        let automaton = compile(query).unwrap();
        let mut buf = json.to_vec();
        while buf.len() % 64 != 0 {
            buf.push(b'x');
        }
        let mut cursor = Cursor::new();
        Walker::new(&buf, &automaton, &mut cursor).run()
    }

    #[test]
    fn test_flat_object_key() {
        assert_eq!(run_query("$.b", br#"{"a":1,"b":2,"c":3}"#), 1);
        assert_eq!(run_query("$.z", br#"{"a":1,"b":2,"c":3}"#), 0);
    }

    #[test]
    fn test_nested_objects() {
        assert_eq!(run_query("$.a.b.c", br#"{"a":{"b":{"c":42}}}"#), 1);
        assert_eq!(run_query("$.a.b.z", br#"{"a":{"b":{"c":42}}}"#), 0);
    }

    #[test]
    fn test_array_slice() {
        assert_eq!(run_query("$.arr[1:4]", br#"{"arr":[10,20,30,40,50]}"#), 3);
    }

    #[test]
    fn test_indexed_object_element() {
        assert_eq!(
            run_query("$.arr[1].k", br#"{"arr":[{"k":1},{"k":2},{"k":3}]}"#),
            1
        );
    }

    #[test]
    fn test_structural_bytes_inside_string() {
        assert_eq!(run_query("$.x", br#"{"s":"a\"b:c,d}","x":5}"#), 1);
    }

    #[test]
    fn test_mixed_array_index() {
        assert_eq!(run_query("$.a[2]", br#"{"a":[1,2,[3,4],{"z":5}],"b":null}"#), 1);
    }

    #[test]
    fn test_iterate_all_elements() {
        assert_eq!(run_query("$[]", br#"[1,2,3]"#), 3);
        assert_eq!(run_query("$.a[]", br#"{"a":[10,20]}"#), 2);
    }

    #[test]
    fn test_iterate_key_in_mixed_array() {
        // Non-object elements are fast-forwarded, not descended into.
        assert_eq!(
            run_query("$.a[].k", br#"{"a":[1,[9],{"k":5},{"k":6}]}"#),
            2
        );
    }

    #[test]
    fn test_nested_arrays_of_objects() {
        assert_eq!(
            run_query("$.a[1][0].k", br#"{"a":[[{"k":1}],[{"k":2}]]}"#),
            1
        );
    }

    #[test]
    fn test_whitespace_between_tokens() {
        assert_eq!(
            run_query("$.b", b"{ \"a\" : 1 ,\n\t\"b\" : 2 }"),
            1
        );
    }

    #[test]
    fn test_root_array_dispatch() {
        assert_eq!(run_query("$[1]", br#"[[1],[2],[3]]"#), 1);
        // An object query never enters an array record.
        assert_eq!(run_query("$.a", br#"[{"a":1}]"#), 0);
    }

    #[test]
    fn test_malformed_input_terminates() {
        let truncated: &[&[u8]] = &[
            br#"{"a":{"b""#,
            br#"{"a":[1,2"#,
            br#"{"a""#,
            br#"{"a":}"#,
            b"{",
            b"[",
        ];
        for json in truncated {
            let _ = run_query("$.a.b", json);
            let _ = run_query("$.a[0:5]", json);
            let _ = run_query("$.a", json);
        }
    }
}
