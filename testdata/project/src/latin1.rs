fn ok() {}
�� broken
