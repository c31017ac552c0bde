macro_rules! __if {
    ((false); $($body:tt)*) => {};
    (($($cond:tt)*); $($body:tt)*) => {
        $($body)*
    };
}

macro_rules! impl_iter {
    (
        on = $name:ident;
        params = { $($params:tt)* };
        args = { $($args:tt)* };
        inner = $inner:ident;
        item = { $($item:tt)* };
        map = $map:tt;
        clone = $clone:tt;
    ) => {
        impl<$($params)*> ::core::iter::Iterator for $name<$($args)*> {
            type Item = $($item)*;

            fn next(&mut self) -> Option<Self::Item> {
                self.nth(0)
            }

            fn nth(&mut self, n: usize) -> Option<Self::Item> {
                let inner = self.$inner.nth(n)?;
                ($map)(self, inner)
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                self.$inner.size_hint()
            }
        }

        impl<$($params)*> ::core::iter::DoubleEndedIterator for $name<$($args)*> {
            fn next_back(&mut self) -> Option<Self::Item> {
                self.nth_back(0)
            }

            fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
                let inner = self.$inner.nth_back(n)?;
                ($map)(self, inner)
            }
        }

        impl<$($params)*> ::core::iter::FusedIterator for $name<$($args)*> {}

        impl<$($params)*> ::core::iter::ExactSizeIterator for $name<$($args)*> {}

        crate::util::__if! {
            ($clone);
            impl<$($params)*> ::core::clone::Clone for $name<$($args)*> {
                fn clone(&self) -> Self {
                    ($clone)(self)
                }
            }
        }
    };
}

pub(crate) use __if;
pub(crate) use impl_iter;
